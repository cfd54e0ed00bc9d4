//! Access key setup page, shown until the board holds a working key.

use dioxus::prelude::*;

const SETUP_STYLES: &str = r#"
.setup { height: 100%; display: flex; align-items: center; justify-content: center; }
.setup-card { width: min(32rem, 90vw); background: #0f172a; border: 1px solid #1e293b; border-radius: 1rem; padding: 2rem; }
.setup-card h1 { margin: 0 0 .5rem; color: #fff; font-size: 1.5rem; }
.setup-card p { margin: 0 0 1.5rem; color: #94a3b8; }
.setup-card label { display: block; margin-bottom: .5rem; font-weight: 600; }
.setup-card input { width: 100%; box-sizing: border-box; padding: .75rem; border-radius: .5rem; border: 1px solid #334155;
  background: #020617; color: #fff; font: 1rem monospace; }
.setup-card button { margin-top: 1rem; width: 100%; padding: .75rem; border: 0; border-radius: .5rem;
  background: #2563eb; color: #fff; font-weight: 700; cursor: pointer; }
.setup-error { margin-bottom: 1rem; padding: .75rem; border-radius: .5rem; background: #450a0a; color: #fca5a5; }
"#;

#[component]
pub fn SetupPage(error: Option<String>) -> Element {
    rsx! {
        crate::ui::components::KioskLayout {
            title: "TV Board setup".to_string(),
            styles: Some(SETUP_STYLES.to_string()),

            div { class: "setup",
                form { class: "setup-card", method: "post", action: "/tv/setup",
                    h1 { i { class: "fas fa-key" } " Board access" }
                    p { "Enter the TV access key issued by the maintenance application." }
                    if let Some(error) = error {
                        div { id: "setup-error", class: "setup-error", "{error}" }
                    }
                    label { r#for: "key", "Access key" }
                    input { id: "key", name: "key", r#type: "text", autocomplete: "off", autofocus: true, required: true }
                    button { r#type: "submit", "Save" }
                }
            }
        }
    }
}
