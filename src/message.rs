//! OSC payloads emitted by the built-in voices
//!
//! Argument layouts:
//! - note: `[key: int, dur: float, amp: float]`
//! - control: `[value: int]`
//! - cell: `[row: int, col: int, value: float...]`

use rosc::{OscMessage, OscType};

use crate::grid::Position;

pub fn note(address: &str, key: i32, dur: f64, amp: f32) -> OscMessage {
    OscMessage {
        addr: address.to_string(),
        args: vec![
            OscType::Int(key),
            OscType::Float(dur as f32),
            OscType::Float(amp),
        ],
    }
}

pub fn control(address: &str, value: i32) -> OscMessage {
    OscMessage {
        addr: address.to_string(),
        args: vec![OscType::Int(value)],
    }
}

pub fn cell(address: &str, position: Position, values: &[f64]) -> OscMessage {
    let mut args = Vec::with_capacity(values.len() + 2);
    args.push(OscType::Int(position.row as i32));
    args.push(OscType::Int(position.col as i32));
    args.extend(values.iter().map(|&v| OscType::Float(v as f32)));
    OscMessage {
        addr: address.to_string(),
        args,
    }
}

/// Arguments as plain JSON values, for printing rendered events
pub fn args_to_json(message: &OscMessage) -> Vec<serde_json::Value> {
    message
        .args
        .iter()
        .map(|arg| match arg {
            OscType::Int(v) => serde_json::json!(v),
            OscType::Long(v) => serde_json::json!(v),
            OscType::Float(v) => serde_json::json!(v),
            OscType::Double(v) => serde_json::json!(v),
            OscType::String(v) => serde_json::json!(v),
            OscType::Bool(v) => serde_json::json!(v),
            other => serde_json::json!(format!("{other:?}")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_layout() {
        let msg = cell("/pixel", Position::new(2, 5), &[0.5, 1.0]);
        assert_eq!(msg.addr, "/pixel");
        assert_eq!(
            msg.args,
            vec![
                OscType::Int(2),
                OscType::Int(5),
                OscType::Float(0.5),
                OscType::Float(1.0)
            ]
        );
    }

    #[test]
    fn test_args_to_json() {
        let msg = note("/note", 60, 0.25, 0.5);
        let json = args_to_json(&msg);
        assert_eq!(json[0], serde_json::json!(60));
        assert_eq!(json[1], serde_json::json!(0.25f32));
    }
}
