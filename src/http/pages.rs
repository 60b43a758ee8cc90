//! Page handlers behind the gate.
//!
//! Portfolio content is rendered elsewhere; these handlers give the gate a
//! downstream to forward to and serve the construction page itself.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::server::AppState;
use crate::routing::{PathClass, PathClassifier};

const CONSTRUCTION_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Under construction</title></head>
<body>
<main>
<h1>Under construction</h1>
<p>This portfolio is being updated. Please check back soon.</p>
</main>
</body>
</html>
"#;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin login</title></head>
<body>
<main>
<h1>Admin login</h1>
<form id="login">
<input type="password" name="password" autocomplete="current-password" required>
<button type="submit">Sign in</button>
</form>
<p id="error" hidden></p>
<script>
document.getElementById("login").addEventListener("submit", async (event) => {
  event.preventDefault();
  const password = new FormData(event.target).get("password");
  const res = await fetch("/api/auth/login", {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify({ password }),
  });
  const body = await res.json();
  if (body.success) {
    const from = new URLSearchParams(location.search).get("from");
    location.href = from && from.startsWith("/admin") ? from : "/admin";
  } else {
    const error = document.getElementById("error");
    error.textContent = body.message;
    error.hidden = false;
  }
});
</script>
</main>
</body>
</html>
"#;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn admin_login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub async fn admin_dashboard(uri: Uri) -> Html<String> {
    Html(format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Admin</title></head>\
         <body><main><h1>Admin dashboard</h1><p>{}</p></main></body></html>",
        escape(uri.path())
    ))
}

/// Everything without a dedicated route: the construction page, public
/// content placeholders, and 404 for unknown assets.
pub async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    let class = match state.site_mode.snapshot() {
        Ok(snapshot) if path == snapshot.mode.redirect_path => {
            return Html(CONSTRUCTION_PAGE).into_response();
        }
        Ok(snapshot) => snapshot.classifier.classify(path),
        Err(_) => PathClassifier::default().classify(path),
    };

    match class {
        PathClass::Public => Html(format!(
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Portfolio</title></head>\
             <body><main><p>{}</p></main></body></html>",
            escape(path)
        ))
        .into_response(),
        PathClass::Api | PathClass::Asset | PathClass::Admin => {
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("/<script>&\""), "/&lt;script&gt;&amp;&quot;");
    }
}
