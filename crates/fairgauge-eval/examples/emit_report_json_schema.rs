use fairgauge_eval::report_json_schema;

fn main() {
    let schema = report_json_schema();
    let json = serde_json::to_string_pretty(&schema).expect("serialize report json schema");
    println!("{json}");
}
