//! Wire formats — endpoints, form bodies, and response decoding.
//!
//! DESIGN
//! ======
//! Pure functions only; the client feeds them transport output. Every
//! decoder returns a plain `String` error that the client tags with the
//! operation as `PokecError::Parse`.
//!
//! The room listing is positional JSON:
//! - group: `[title, rooms, group_id]`
//! - room:  `[title, room_id, chatter_count]`
//!
//! Form bodies are `k=v&k=v` with values left unescaped; the service's
//! parser expects exactly that.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Number, Value};

// =============================================================================
// ENDPOINTS
// =============================================================================

pub const CHAT_HOST: &str = "pokec-sklo.azet.sk";
pub const AUTH_HOST: &str = "prihlasenie.azet.sk";
pub const STATUS_HOST: &str = "pokec.azet.sk";
pub const HTTPS_PORT: u16 = 443;

pub const ROOMS_PATH: &str = "/zoznam-miestnosti/";
pub const LOGIN_PATH: &str = "/overenie?isWap=0";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

#[must_use]
pub fn send_message_path(token: &str) -> String {
    format!("/_s/sklo/posliPrispevok.php?i9={token}")
}

#[must_use]
pub fn ping_path(token: &str, timestamp_ms: u128) -> String {
    format!("/_s/system/ping.php?i9={token}&callback=jsonp&st=&cf=0&_={timestamp_ms}")
}

// =============================================================================
// FORM ENCODING
// =============================================================================

/// Join pairs as `k=v&k=v`, preserving order. Values are not escaped.
#[must_use]
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

// =============================================================================
// ROOM LISTING
// =============================================================================

const GROUP_TITLE: usize = 0;
const GROUP_ROOMS: usize = 1;
const GROUP_ID: usize = 2;

const ROOM_TITLE: usize = 0;
const ROOM_ID: usize = 1;
const ROOM_CHATTERS: usize = 2;

/// An active room. `chatters` is the count exactly as the service sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub chatters: Number,
}

/// A category of rooms. Only non-empty groups are ever produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomGroup {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub rooms: Vec<Room>,
}

/// Decode the listing, dropping rooms with no chatters and groups left empty.
pub fn parse_rooms(body: &str) -> Result<Vec<RoomGroup>, String> {
    let root: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let groups = root.as_array().ok_or("room listing is not an array")?;

    let mut out = Vec::new();
    for group in groups {
        let rooms = field(group, GROUP_ROOMS)?
            .as_array()
            .ok_or("group rooms is not an array")?
            .iter()
            .filter_map(|room| parse_room(room).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        if rooms.is_empty() {
            continue;
        }
        out.push(RoomGroup {
            id: id_string(field(group, GROUP_ID)?),
            title: text(field(group, GROUP_TITLE)?),
            rooms,
        });
    }
    Ok(out)
}

/// `None` for a room without chatters, including one whose count slot is absent.
fn parse_room(room: &Value) -> Result<Option<Room>, String> {
    let Some(chatters) = field(room, ROOM_CHATTERS).ok().and_then(chatter_count) else {
        return Ok(None);
    };
    Ok(Some(Room {
        id: id_string(field(room, ROOM_ID)?),
        title: text(field(room, ROOM_TITLE)?),
        chatters,
    }))
}

fn field(tuple: &Value, index: usize) -> Result<&Value, String> {
    tuple
        .as_array()
        .and_then(|items| items.get(index))
        .ok_or_else(|| format!("expected positional entry with index {index}"))
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn text(value: &Value) -> String {
    value.as_str().map_or_else(|| id_string(value), str::to_string)
}

/// A count is kept only when truthy: a non-zero number, or a string holding
/// one. Zero, `null`, booleans, and non-numeric strings are all falsy.
fn chatter_count(value: &Value) -> Option<Number> {
    let number = match value {
        Value::Number(n) => n.clone(),
        Value::String(s) => s.trim().parse::<Number>().ok()?,
        _ => return None,
    };
    number.as_f64().filter(|n| *n != 0.0 && !n.is_nan()).map(|_| number)
}

// =============================================================================
// LOGIN TOKEN
// =============================================================================

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"i9["' =]+(.+?)["' ;]+"#).expect("token pattern compiles"))
}

/// Find the session token assigned to `i9` in the login page.
#[must_use]
pub fn extract_token(body: &str) -> Option<String> {
    token_pattern()
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// =============================================================================
// PING
// =============================================================================

fn jsonp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^jsonp\(|\);?$").expect("jsonp pattern compiles"))
}

/// Remove a leading `jsonp(` and a trailing `)` or `);`, each if present.
#[must_use]
pub fn strip_jsonp(body: &str) -> String {
    jsonp_pattern().replace_all(body, "").into_owned()
}

pub fn parse_ping(body: &str) -> Result<Value, String> {
    serde_json::from_str(&strip_jsonp(body)).map_err(|e| e.to_string())
}

// =============================================================================
// SEND MESSAGE
// =============================================================================

/// Outcome reported by the message endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Accepted,
    Rejected { reason: Option<String> },
}

pub fn parse_send_result(body: &str) -> Result<SendOutcome, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;

    if value.get("sendMessage").and_then(Value::as_f64) == Some(1.0) {
        return Ok(SendOutcome::Accepted);
    }

    let reason = value
        .get("errorMessage")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok(SendOutcome::Rejected { reason })
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
