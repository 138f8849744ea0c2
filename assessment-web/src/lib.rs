use assessment_lib::*;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

thread_local! {
    static CONFIG: RefCell<AppConfig> = RefCell::new(AppConfig::default());
}

/// `window.localStorage` as a handoff store.
struct LocalStorage(web_sys::Storage);

impl LocalStorage {
    fn open() -> Result<Self, StoreError> {
        let window = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(js_message(&e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(LocalStorage(storage))
    }
}

impl HandoffStore for LocalStorage {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0
            .set_item(key, value)
            .map_err(|e| StoreError::WriteRejected(js_message(&e)))
    }

    fn peek(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(js_message(&e)))
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        self.0
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable(js_message(&e)))
    }
}

struct LocationNavigator;

impl Navigator for LocationNavigator {
    fn navigate(&mut self, target: &Navigation) -> Result<(), NavigationError> {
        let failed = |reason: String| NavigationError {
            target: target.href(),
            reason,
        };
        let window = web_sys::window().ok_or_else(|| failed("no window".to_string()))?;
        window
            .location()
            .set_href(&target.href())
            .map_err(|e| failed(js_message(&e)))
    }
}

fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

/// Replace the page configuration with the given JSON overrides.
#[wasm_bindgen]
pub fn configure(config_json: &str) -> Result<(), JsValue> {
    let config = AppConfig::from_json(config_json).map_err(to_js_error)?;
    CONFIG.with(|current| *current.borrow_mut() = config);
    Ok(())
}

/// Resolve the results page for `location.search`; returns the view as JSON.
#[wasm_bindgen]
pub fn results_view(search: &str) -> Result<String, JsValue> {
    let outcome = decode_payload(query_param(search, PROFILE_PARAM));
    if let Some(DecodeFailure::ParseError(kind)) = outcome.failure() {
        console_log!("Error parsing profile data: {}", kind);
    }

    let view = CONFIG.with(|config| view_for_outcome(&config.borrow(), outcome));
    view.to_json().map_err(to_js_error)
}

/// Store the template in localStorage and redirect to the builder.
/// Storage and navigation faults are thrown.
#[wasm_bindgen]
pub fn select_template(template_json: &str) -> Result<String, JsValue> {
    let template = Template::from_json(template_json).map_err(to_js_error)?;
    let mut store = LocalStorage::open().map_err(to_js_error)?;
    let config = CONFIG.with(|config| config.borrow().clone());

    let target = handoff::select_template(&mut store, &mut LocationNavigator, &config, &template)
        .map_err(to_js_error)?;
    Ok(target.href())
}

/// The stored template JSON, if it is the one `location.search` asks for.
#[wasm_bindgen]
pub fn selected_template(search: &str) -> Result<Option<String>, JsValue> {
    let store = LocalStorage::open().map_err(to_js_error)?;
    let config = CONFIG.with(|config| config.borrow().clone());

    match load_selected_template(&store, &config, search).map_err(to_js_error)? {
        Some(template) => serde_json::to_string(&template)
            .map(Some)
            .map_err(to_js_error),
        None => Ok(None),
    }
}

#[wasm_bindgen]
pub fn share_link(profile_json: &str) -> Result<String, JsValue> {
    let profile: serde_json::Value = serde_json::from_str(profile_json).map_err(to_js_error)?;
    let results_path = CONFIG.with(|config| config.borrow().results_path.clone());
    query::share_link(&results_path, &profile).map_err(to_js_error)
}

#[wasm_bindgen(start)]
pub fn main() {
    console_log!("assessment WASM module loaded");
}
