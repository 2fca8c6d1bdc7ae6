use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedClientMessage {
    SelectClass {
        class: String,
        name: Option<String>,
    },
    UpdatePosition {
        x: f32,
        y: f32,
        angle: Option<f32>,
    },
    Shoot {
        angle: f32,
    },
    Reload,
    CollectPowerUp {
        id: String,
    },
    Ping {
        t: Option<f64>,
    },
}

/// Parses one inbound text frame. Anything malformed, including
/// non-finite numbers, yields `None` and is dropped by the caller.
pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "selectClass" => {
            let class = object.get("class")?.as_str()?.to_string();
            let name = match object.get("name") {
                None | Some(Value::Null) => None,
                Some(value) => Some(value.as_str()?.to_string()),
            };
            Some(ParsedClientMessage::SelectClass { class, name })
        }
        "updatePosition" => {
            let x = finite_f32(object.get("x")?)?;
            let y = finite_f32(object.get("y")?)?;
            let angle = match object.get("angle") {
                None | Some(Value::Null) => None,
                Some(value) => Some(finite_f32(value)?),
            };
            Some(ParsedClientMessage::UpdatePosition { x, y, angle })
        }
        "shoot" => {
            let angle = finite_f32(object.get("angle")?)?;
            Some(ParsedClientMessage::Shoot { angle })
        }
        "reload" => Some(ParsedClientMessage::Reload),
        "collectPowerUp" => {
            let id = object.get("id")?.as_str()?.to_string();
            Some(ParsedClientMessage::CollectPowerUp { id })
        }
        "ping" => {
            let t = match object.get("t") {
                None | Some(Value::Null) => None,
                Some(value) => {
                    let t = value.as_f64()?;
                    if !t.is_finite() {
                        return None;
                    }
                    Some(t)
                }
            };
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

fn finite_f32(value: &Value) -> Option<f32> {
    let number = value.as_f64()?;
    let narrowed = number as f32;
    narrowed.is_finite().then_some(narrowed)
}
