use fairgauge_policy::policy_json_schema;

fn main() {
    let schema = policy_json_schema();
    let json = serde_json::to_string_pretty(&schema).expect("serialize policy json schema");
    println!("{json}");
}
