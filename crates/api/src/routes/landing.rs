//! Landing page handler.

use axum::response::Html;

use crate::extractors::CurrentUser;
use crate::views;

/// GET / - identity summary and tool navigation.
pub async fn landing(CurrentUser(user): CurrentUser) -> Html<String> {
    Html(views::landing_page(&user))
}
