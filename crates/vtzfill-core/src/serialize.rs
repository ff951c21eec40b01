use crate::model::{Calendar, Component, Parameter, Property};

const MAX_LINE_OCTETS: usize = 75;

impl Calendar {
    /// Renders the calendar as CRLF-terminated, folded content lines.
    pub fn to_ics(&self) -> String {
        let mut out = String::new();
        write_block(&mut out, "VCALENDAR", &self.properties, &self.components);
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_ics().into_bytes()
    }
}

impl Component {
    pub fn to_ics(&self) -> String {
        let mut out = String::new();
        write_component(&mut out, self);
        out
    }
}

fn write_component(out: &mut String, component: &Component) {
    write_block(
        out,
        component.kind.as_str(),
        &component.properties,
        &component.components,
    );
}

fn write_block(out: &mut String, name: &str, properties: &[Property], components: &[Component]) {
    push_folded(out, &format!("BEGIN:{name}"));
    for property in properties {
        push_folded(out, &content_line(property));
    }
    for component in components {
        write_component(out, component);
    }
    push_folded(out, &format!("END:{name}"));
}

fn content_line(property: &Property) -> String {
    let mut line = property.name.clone();
    for param in &property.params {
        line.push(';');
        line.push_str(&render_param(param));
    }
    line.push(':');
    line.push_str(&property.value);
    line
}

fn render_param(param: &Parameter) -> String {
    let values: Vec<String> = param.values.iter().map(|v| quote_param_value(v)).collect();
    format!("{}={}", param.name, values.join(","))
}

fn quote_param_value(value: &str) -> String {
    let value = value.replace('"', "");
    if value.contains([':', ';', ',']) {
        format!("\"{value}\"")
    } else {
        value
    }
}

/// Appends `line` folded at 75 octets without splitting a UTF-8 sequence.
fn push_folded(out: &mut String, line: &str) {
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(ch);
        width += len;
    }
    out.push_str("\r\n");
}
