//! Minimal HTML pages and the health check.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    response::{Html, IntoResponse},
    routing::get,
};

use crate::{
    auth_middleware::{CurrentIdentity, require_page_auth},
    state::AppState,
};

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<form id="login">
  <input name="email" type="email" placeholder="Email" required>
  <input name="password" type="password" placeholder="Password" required>
  <button type="submit">Sign in</button>
  <p id="error" role="alert"></p>
</form>
<script>
document.getElementById("login").addEventListener("submit", async (e) => {
  e.preventDefault();
  const form = new FormData(e.target);
  const res = await fetch("/login", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ email: form.get("email"), password: form.get("password") }),
  });
  if (res.ok) { window.location = "/"; return; }
  const body = await res.json().catch(() => ({}));
  document.getElementById("error").textContent = body.error || "Sign-in failed";
});
</script>
</body>
</html>
"#;

/// Page routes. `/` sits behind the page gate.
pub fn page_router(state: AppState) -> Router<AppState> {
    let gated = Router::new()
        .route("/", get(dashboard_handler))
        .route_layer(middleware::from_fn_with_state(state, require_page_auth));

    Router::new()
        .route("/login", get(login_page_handler))
        .route("/health", get(health_handler))
        .merge(gated)
}

async fn login_page_handler() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

async fn dashboard_handler(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Html<String> {
    Html(render_dashboard(&identity.name, &identity.email, &state.login_path))
}

/// Sign-out posts via `fetch` so the browser lands on `login_path`, not the
/// JSON acknowledgement.
fn render_dashboard(name: &str, email: &str, login_path: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Dashboard</title></head>
<body>
<h1>Welcome, {name}</h1>
<p>Signed in as {email}</p>
<button id="logout" type="button">Sign out</button>
<script>
document.getElementById("logout").addEventListener("click", async () => {{
  await fetch("/logout", {{ method: "POST" }}).catch(() => {{}});
  window.location = {target};
}});
</script>
</body>
</html>
"#,
        name = escape_html(name),
        email = escape_html(email),
        target = js_string(login_path),
    )
}

/// Quote `s` as a JS string literal that cannot close the script element.
fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string().replace('<', "\\u003c")
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn login_page_posts_json_to_login() {
        assert!(LOGIN_PAGE.contains("fetch(\"/login\""));
        assert!(LOGIN_PAGE.contains("type=\"password\""));
    }

    #[test]
    fn dashboard_signs_out_with_fetch_and_returns_to_login() {
        let html = render_dashboard("Alice", "alice@example.com", "/signin");
        assert!(html.contains("fetch(\"/logout\", { method: \"POST\" })"));
        assert!(html.contains("window.location = \"/signin\";"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn login_path_cannot_break_out_of_the_script() {
        let html = render_dashboard("A", "a@example.com", "/x\"</script><script>alert(1)//");
        assert_eq!(html.matches("</script>").count(), 1);
        assert!(html.contains(r#"window.location = "/x\"\u003c/script>\u003cscript>alert(1)//";"#));
    }
}
