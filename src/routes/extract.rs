use axum::extract::FromRequest;

use crate::error::Error;

/// `Json` body extractor whose rejections come back through `Error`, so a
/// missing field or a wrong type is a 400 with the usual `{"error": ...}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);
