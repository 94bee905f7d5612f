//! Declarative request-field validation
//!
//! A rule table maps route name to its required fields and maximum field
//! count, so per-route rules stay data, not conditional chains. The core
//! assumes input that passes here is well-formed and size-bounded.

use serde_json::Value;

pub struct RouteRules {
    pub required: &'static [&'static str],
    pub max_fields: usize,
}

const MIN_PASSWORD_LEN: usize = 5;

pub fn rules_for(route: &str) -> Option<RouteRules> {
    let rules = match route {
        "signup" => RouteRules {
            required: &["firstname", "lastname", "email", "password"],
            max_fields: 4,
        },
        "signin" => RouteRules {
            required: &["email", "password"],
            max_fields: 2,
        },
        "social" => RouteRules {
            required: &["email", "secret", "firstname", "lastname", "provider"],
            max_fields: 5,
        },
        "forgotPassword" => RouteRules {
            required: &["email"],
            max_fields: 1,
        },
        "resetPassword" => RouteRules {
            required: &["password", "confirm_password"],
            max_fields: 2,
        },
        "follow" | "unfollow" => RouteRules {
            required: &["userId"],
            max_fields: 1,
        },
        _ => return None,
    };
    Some(rules)
}

/// Validate a JSON payload against the route's rules. Returns the message
/// to answer 400 with on the first violated rule.
pub fn validate_payload(route: &str, payload: &Value) -> Result<(), String> {
    let Some(rules) = rules_for(route) else {
        return Ok(());
    };
    let Some(fields) = payload.as_object() else {
        return Err("Invalid Input".to_string());
    };

    let missing: Vec<&str> = rules
        .required
        .iter()
        .filter(|name| {
            match fields.get(**name) {
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(Value::Null) | None => true,
                Some(_) => false,
            }
        })
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(missing_fields_message(&missing));
    }

    if fields.len() > rules.max_fields {
        return Err("Too many fields".to_string());
    }

    if rules.required.contains(&"email") {
        let email = fields.get("email").and_then(Value::as_str).unwrap_or("");
        if !is_valid_email(email) {
            return Err("Please enter a valid email".to_string());
        }
    }

    if rules.required.contains(&"password") {
        let password = fields.get("password").and_then(Value::as_str).unwrap_or("");
        if password.len() < MIN_PASSWORD_LEN {
            return Err("Passwords must be greater than four characters".to_string());
        }
        if let Some(confirm) = fields.get("confirm_password").and_then(Value::as_str) {
            if confirm != password {
                return Err("Passwords do not match".to_string());
            }
        }
    }

    Ok(())
}

/// "Please fill the email field" / "Please fill the firstname, lastname,
/// email, and password fields" — the list phrasing callers rely on.
fn missing_fields_message(missing: &[&str]) -> String {
    let mut msg = String::from("Please fill the ");
    match missing {
        [only] => {
            msg.push_str(only);
            msg.push_str(" field");
        }
        [init @ .., last] => {
            for field in init {
                msg.push_str(field);
                msg.push_str(", ");
            }
            msg.push_str("and ");
            msg.push_str(last);
            msg.push_str(" fields");
        }
        [] => unreachable!("called with at least one missing field"),
    }
    msg
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && tld.chars().all(|c| c.is_ascii_alphabetic())
        && tld.len() >= 2
        && local.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
}
