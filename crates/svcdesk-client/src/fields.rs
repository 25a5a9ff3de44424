//! # Field aliases over loosely typed backend records
//!
//! Backend deployments disagree on field names for the same logical
//! attribute (a contract's status may be `status`, `state` or
//! `contract_status`). Each logical attribute is described by a [`Field`]:
//! an ordered list of JSON paths tried until one yields a present value.
//!
//! Two presence rules exist because the backend mixes them:
//!
//! - [`Presence::Defined`] skips only `null` and missing keys.
//! - [`Presence::Truthy`] additionally skips `""`, `0` and `false`.
//!
//! [`Envelope`] applies the same idea to response bodies: the payload may be
//! wrapped in `data`, `user`, `contract`, `contracts[0]`, ... or be the body
//! itself.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Placeholder rendered when a value is absent.
pub const PLACEHOLDER: &str = "—";

/// One step into a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Object member by key.
    Key(&'static str),
    /// First element of an array.
    First,
}

/// A path of steps from a record root.
pub type Path = &'static [Step];

/// Which values count as "present" when walking an alias list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Defined,
    Truthy,
}

impl Presence {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Defined => !value.is_null(),
            Self::Truthy => is_truthy(value),
        }
    }
}

/// JavaScript-style truthiness for JSON values. Objects and arrays are
/// always truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Follow `path` from `root`.
pub fn lookup<'a>(root: &'a Value, path: &[Step]) -> Option<&'a Value> {
    path.iter().try_fold(root, |cur, step| match step {
        Step::Key(k) => cur.as_object()?.get(*k),
        Step::First => cur.as_array()?.first(),
    })
}

/// String form of a scalar, as the backend's web client would print it.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A logical attribute and its aliases, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub aliases: &'static [Path],
    pub presence: Presence,
}

impl Field {
    pub const fn defined(aliases: &'static [Path]) -> Self {
        Self {
            aliases,
            presence: Presence::Defined,
        }
    }

    pub const fn truthy(aliases: &'static [Path]) -> Self {
        Self {
            aliases,
            presence: Presence::Truthy,
        }
    }

    /// First alias yielding a present value.
    pub fn get<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.aliases
            .iter()
            .filter_map(|path| lookup(record, path))
            .find(|v| self.presence.accepts(v))
    }

    /// The attribute as text. Objects and arrays are rendered as JSON.
    pub fn text(&self, record: &Value) -> Option<String> {
        self.get(record)
            .map(|v| scalar_text(v).unwrap_or_else(|| v.to_string()))
    }

    /// The attribute as text, or [`PLACEHOLDER`].
    pub fn display(&self, record: &Value) -> String {
        self.text(record).unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// The attribute rendered as a `YYYY-MM-DD` date when it parses as one,
    /// its raw text otherwise, or [`PLACEHOLDER`] when absent.
    pub fn date(&self, record: &Value) -> String {
        match self.text(record) {
            Some(raw) => format_date(&raw).unwrap_or(raw),
            None => PLACEHOLDER.to_string(),
        }
    }
}

/// Normalise common backend date encodings to `YYYY-MM-DD`.
pub fn format_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date().format("%Y-%m-%d").to_string());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

// -- Envelopes ----------------------------------------------------------------

/// Where a resource's payload sits inside a successful response body.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    /// Wrapper paths tried in order; the raw body is the final fallback.
    pub wrappers: &'static [Path],
    pub presence: Presence,
    /// Take the first element when the extracted payload is an array.
    pub first_of_array: bool,
}

impl Envelope {
    /// The body itself.
    pub const RAW: Self = Self {
        wrappers: &[],
        presence: Presence::Defined,
        first_of_array: false,
    };

    /// Conventional wrappers for an arbitrary resource.
    pub const GENERIC: Self = Self {
        wrappers: &[
            &[Step::Key("data")],
            &[Step::Key("user")],
            &[Step::Key("client")],
            &[Step::Key("contract")],
            &[Step::Key("contracts"), Step::First],
            &[Step::Key("item")],
        ],
        presence: Presence::Defined,
        first_of_array: false,
    };

    /// Current user profile.
    pub const PROFILE: Self = Self {
        wrappers: &[
            &[Step::Key("data")],
            &[Step::Key("user")],
            &[Step::Key("client")],
        ],
        presence: Presence::Truthy,
        first_of_array: false,
    };

    /// Current contract.
    pub const CONTRACT: Self = Self {
        wrappers: &[
            &[Step::Key("contract")],
            &[Step::Key("data"), Step::Key("contract")],
            &[Step::Key("contracts"), Step::First],
            &[Step::Key("data"), Step::Key("contracts"), Step::First],
            &[Step::Key("data")],
            &[Step::Key("item")],
        ],
        presence: Presence::Defined,
        first_of_array: true,
    };

    /// Extract the payload from `body`.
    pub fn extract(&self, body: &Value) -> Value {
        let found = self
            .wrappers
            .iter()
            .filter_map(|path| lookup(body, path))
            .find(|v| self.presence.accepts(v))
            .unwrap_or(body);
        match found {
            Value::Array(items) if self.first_of_array => {
                items.first().cloned().unwrap_or(Value::Null)
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: Field = Field::defined(&[
        &[Step::Key("id")],
        &[Step::Key("user_id")],
        &[Step::Key("client_id")],
    ]);
    const NAME: Field = Field::truthy(&[&[Step::Key("name")], &[Step::Key("full_name")]]);

    #[test]
    fn defined_presence_keeps_zero_and_empty() {
        assert_eq!(ID.text(&json!({"id": 0, "user_id": 5})).as_deref(), Some("0"));
        assert_eq!(ID.text(&json!({"id": null, "user_id": 5})).as_deref(), Some("5"));
    }

    #[test]
    fn truthy_presence_skips_empty_strings() {
        let rec = json!({"name": "", "full_name": "Nino Beridze"});
        assert_eq!(NAME.display(&rec), "Nino Beridze");
        assert_eq!(NAME.display(&json!({})), PLACEHOLDER);
    }

    #[test]
    fn lookup_walks_nested_arrays() {
        let body = json!({"data": {"contracts": [{"id": 1}, {"id": 2}]}});
        let path: Path = &[Step::Key("data"), Step::Key("contracts"), Step::First];
        assert_eq!(lookup(&body, path), Some(&json!({"id": 1})));
        assert_eq!(lookup(&json!({"data": 3}), path), None);
    }

    #[test]
    fn date_formats_known_encodings() {
        const CREATED: Field = Field::truthy(&[&[Step::Key("created_at")]]);
        assert_eq!(CREATED.date(&json!({"created_at": "2024-03-05T10:20:30Z"})), "2024-03-05");
        assert_eq!(CREATED.date(&json!({"created_at": "2024-03-05 10:20:30"})), "2024-03-05");
        assert_eq!(CREATED.date(&json!({"created_at": "next week"})), "next week");
        assert_eq!(CREATED.date(&json!({})), PLACEHOLDER);
    }

    #[test]
    fn generic_envelope_unwraps_data() {
        let body = json!({"data": {"id": 7, "name": "X"}});
        assert_eq!(Envelope::GENERIC.extract(&body), json!({"id": 7, "name": "X"}));
        assert_eq!(Envelope::GENERIC.extract(&json!({"id": 1})), json!({"id": 1}));
    }

    #[test]
    fn contract_envelope_prefers_contract_then_first_of_list() {
        let body = json!({"contracts": [{"number": "C-1"}, {"number": "C-2"}], "data": {"x": 1}});
        assert_eq!(Envelope::CONTRACT.extract(&body), json!({"number": "C-1"}));

        let body = json!({"data": [{"number": "C-9"}]});
        assert_eq!(Envelope::CONTRACT.extract(&body), json!({"number": "C-9"}));
    }

    #[test]
    fn profile_envelope_skips_falsy_wrappers() {
        let body = json!({"data": null, "user": {"name": "A"}});
        assert_eq!(Envelope::PROFILE.extract(&body), json!({"name": "A"}));
    }
}
