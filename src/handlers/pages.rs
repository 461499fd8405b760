use axum::response::Html;

use crate::ui::page::render_index;

/// `GET /`
pub async fn index_handler() -> Html<String> {
    Html(render_index(None))
}
