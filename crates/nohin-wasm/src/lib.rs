//! WASM bindings for delivery ledger extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use wasm_bindgen::prelude::*;

use nohin_core::directory::parse_delimiter;
use nohin_core::ledger::rules::{format_ledger_amount, parse_ledger_amount};
use nohin_core::{LedgerConfig, LedgerParser, TwoTokenPolicy, VendorDirectory};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract rows and summary from ledger text with the default configuration.
#[wasm_bindgen]
pub fn parse_ledger(text: &str) -> Result<JsValue, JsValue> {
    to_js(&LedgerParser::new().parse(text))
}

/// Look up the directory entry whose keyword occurs in `vendor`.
///
/// Returns `undefined` when nothing matches. The delimiter defaults to a comma.
#[wasm_bindgen]
pub fn lookup_vendor(
    directory_text: &str,
    vendor: &str,
    delimiter: Option<String>,
) -> Result<JsValue, JsValue> {
    let delimiter = parse_delimiter(delimiter.as_deref().unwrap_or(","))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let directory = VendorDirectory::from_reader(directory_text.as_bytes(), delimiter)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_js(&directory.lookup(vendor))
}

/// Reformat a printed amount (e.g. "¥1,047,148-") as "1,047,148.00".
#[wasm_bindgen]
pub fn format_amount(amount: &str) -> Option<String> {
    parse_ledger_amount(amount).map(format_ledger_amount)
}

/// Ledger parser class for browser use.
#[wasm_bindgen(js_name = LedgerParser)]
pub struct LedgerParserJs {
    parser: LedgerParser,
}

#[wasm_bindgen(js_class = LedgerParser)]
impl LedgerParserJs {
    /// Create a parser with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: LedgerParser::new(),
        }
    }

    /// Create a parser from a JSON configuration document.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config_json: &str) -> Result<LedgerParserJs, JsValue> {
        let config: LedgerConfig =
            serde_json::from_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            parser: LedgerParser::new().with_config(config),
        })
    }

    /// Set the two-token policy ("amount-only" or "computed-amount").
    #[wasm_bindgen(js_name = setTwoTokenPolicy)]
    pub fn set_two_token_policy(&mut self, policy: &str) -> Result<(), JsValue> {
        let policy: TwoTokenPolicy = serde_json::from_value(serde_json::Value::from(policy))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.parser = self.parser.clone().with_two_token_policy(policy);
        Ok(())
    }

    /// Extract rows and summary from ledger text.
    #[wasm_bindgen]
    pub fn parse(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse(text))
    }

    /// Current configuration as pretty JSON.
    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(self.parser.config())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for LedgerParserJs {
    fn default() -> Self {
        Self::new()
    }
}
