use fuzzer_core::TestId;
use serde_json::Value;

/// Rewrites a freshly-filled payload's top-level `randomStatetest` key to
/// `randomStatetest<id>` (uniqueness downstream, spec §4.E), and, if a
/// post-state keyed `Byzantium` is present and `fork` names a different
/// fork, re-keys it to `fork` preserving the value.
pub fn rekey_payload(payload: Value, id: &TestId, fork: Option<&str>) -> Value {
    let Value::Object(mut top) = payload else {
        return payload;
    };
    let Some(mut inner) = top.remove("randomStatetest") else {
        return Value::Object(top);
    };

    if let Some(fork_name) = fork {
        if fork_name != "Byzantium" {
            if let Value::Object(ref mut inner_obj) = inner {
                if let Some(Value::Object(post_obj)) = inner_obj.get_mut("post") {
                    if let Some(byzantium_value) = post_obj.remove("Byzantium") {
                        post_obj.insert(fork_name.to_string(), byzantium_value);
                    }
                }
            }
        }
    }

    top.insert(format!("randomStatetest{id}"), inner);
    Value::Object(top)
}
