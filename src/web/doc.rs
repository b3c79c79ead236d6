use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(
    crate::web::routes::categories::categories_list_handler,
    crate::web::routes::exams::exams_list_handler,
    crate::web::routes::exams::exam_questions_handler,
    crate::web::routes::sessions::session_start_handler,
    crate::web::routes::sessions::session_answer_handler,
    crate::web::routes::sessions::session_complete_handler,
    crate::web::routes::sessions::session_results_handler,
))]
pub struct ApiDoc;
