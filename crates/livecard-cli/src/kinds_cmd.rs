//! `livecard kinds`: print the kind catalog.

use livecard_core::KindRegistry;
use livecard_core::kind::FieldSpec;

pub fn run_kinds() {
    print!("{}", render_kinds(&KindRegistry::builtin()));
}

fn render_fields(fields: &[FieldSpec]) -> String {
    fields
        .iter()
        .map(|f| {
            let ty = type_name(f);
            if f.required {
                format!("{} ({ty}, required)", f.name)
            } else {
                format!("{} ({ty})", f.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn type_name(field: &FieldSpec) -> String {
    serde_json::to_value(field.ty)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", field.ty))
}

fn render_kinds(kinds: &KindRegistry) -> String {
    let mut out = String::new();
    for kind in kinds.iter() {
        out.push_str(kind.name);
        out.push('\n');
        out.push_str(&format!("  attributes: {}\n", render_fields(kind.attribute_fields)));
        out.push_str(&format!("  content:    {}\n", render_fields(kind.content_fields)));
    }
    out
}
