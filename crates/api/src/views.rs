//! Server-rendered HTML pages.
//!
//! Every interpolated value goes through [`escape`].

use axum::http::StatusCode;
use domain::models::DeviceView;

use crate::middleware::proxy_auth::ProxyIdentity;
use crate::services::flash::FlashMessage;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:60rem;color:#222}\
nav a{margin-right:1rem}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:.4rem .6rem;text-align:left}\
.alert{padding:.6rem 1rem;margin:.5rem 0;border-radius:4px}\
.alert-success{background:#e6f4ea;border:1px solid #34a853}\
.alert-danger{background:#fce8e6;border:1px solid #d93025}\
form.inline{display:inline}\
label{display:block;margin-top:.8rem}";

/// HTML-escapes text for element content and quoted attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(title: &str, header: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} | VLAN Portal</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n{header}<main>\n<h1>{title}</h1>\n{body}</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn layout(title: &str, user: &ProxyIdentity, body: &str) -> String {
    let mode = if user.is_simulated() {
        " <strong>(development mode)</strong>"
    } else {
        ""
    };
    let header = format!(
        "<header><nav><a href=\"/\">Home</a><a href=\"/devices\">Devices</a></nav>\
         <p>Signed in as {}{}</p></header>\n",
        escape(user.display_name()),
        mode
    );
    document(title, &header, body)
}

fn alerts(messages: &[FlashMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            format!(
                "<div class=\"alert alert-{}\" role=\"alert\">{}</div>\n",
                m.level.as_str(),
                escape(&m.message)
            )
        })
        .collect()
}

fn optional(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_default()
}

/// Landing page with the proxy-supplied identity and tool navigation.
pub fn landing_page(user: &ProxyIdentity) -> String {
    let privileged = if user.is_privileged() { "Yes" } else { "No" };
    let body = format!(
        "<dl>\n\
         <dt>User</dt><dd>{}</dd>\n\
         <dt>Name</dt><dd>{}</dd>\n\
         <dt>Email</dt><dd>{}</dd>\n\
         <dt>Groups</dt><dd>{}</dd>\n\
         <dt>Device administrator</dt><dd>{}</dd>\n\
         </dl>\n\
         <h2>Tools</h2>\n<ul><li><a href=\"/devices\">Device Management</a></li></ul>\n",
        escape(user.user_or_unknown()),
        optional(user.name.as_deref()),
        optional(user.email.as_deref()),
        escape(&user.groups.join(", ")),
        privileged,
    );
    layout("Internal Tools", user, &body)
}

/// Device table. Edit and delete controls are shown to privileged users only.
pub fn device_list_page(
    user: &ProxyIdentity,
    devices: &[DeviceView],
    messages: &[FlashMessage],
) -> String {
    let privileged = user.is_privileged();
    let mut body = alerts(messages);

    if privileged {
        body.push_str("<p><a href=\"/devices/add\">Add device</a></p>\n");
    }

    if devices.is_empty() {
        body.push_str("<p>No devices registered.</p>\n");
        return layout("Devices", user, &body);
    }

    body.push_str("<table>\n<thead><tr><th>MAC Address</th><th>Description</th><th>VLAN</th>");
    if privileged {
        body.push_str("<th>Actions</th>");
    }
    body.push_str("</tr></thead>\n<tbody>\n");

    for device in devices {
        let mac = escape(&device.formatted_mac());
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            mac,
            optional(device.description.as_deref()),
            device
                .vlan_name
                .as_deref()
                .map(escape)
                .unwrap_or_else(|| "<em>none</em>".to_string()),
        ));
        if privileged {
            body.push_str(&format!(
                "<td><a href=\"/devices/edit/{mac}\">Edit</a> \
                 <form class=\"inline\" method=\"post\" action=\"/devices/delete/{mac}\">\
                 <button type=\"submit\">Delete</button></form></td>",
            ));
        }
        body.push_str("</tr>\n");
    }
    body.push_str("</tbody>\n</table>\n");

    layout("Devices", user, &body)
}

/// Which form is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit,
}

/// Add/edit form, optionally pre-filled from a view.
///
/// In edit mode the MAC field is read-only and the form posts back to the
/// device's own edit URL.
pub fn device_form_page(
    user: &ProxyIdentity,
    mode: FormMode,
    view: Option<&DeviceView>,
    vlan_names: &[String],
    messages: &[FlashMessage],
) -> String {
    let (title, action, mac_attrs) = match mode {
        FormMode::Add => ("Add Device", "/devices/add".to_string(), " required"),
        FormMode::Edit => (
            "Edit Device",
            format!(
                "/devices/edit/{}",
                escape(&view.map(|v| v.formatted_mac()).unwrap_or_default())
            ),
            " readonly",
        ),
    };

    let mac_value = view.map(|v| escape(&v.mac_input)).unwrap_or_default();
    let description = optional(view.and_then(|v| v.description.as_deref()));
    let selected = view.and_then(|v| v.vlan_name.as_deref());

    let mut options = String::from("<option value=\"\">Select a VLAN</option>");
    for name in vlan_names {
        let marker = if Some(name.as_str()) == selected {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(name),
            marker
        ));
    }

    let body = format!(
        "{alerts}<form method=\"post\" action=\"{action}\">\n\
         <label for=\"mac_address\">MAC Address</label>\n\
         <input id=\"mac_address\" name=\"mac_address\" value=\"{mac_value}\" \
         placeholder=\"XX:XX:XX:XX:XX:XX\"{mac_attrs}>\n\
         <label for=\"vlan_name\">VLAN</label>\n\
         <select id=\"vlan_name\" name=\"vlan_name\">{options}</select>\n\
         <label for=\"description\">Description</label>\n\
         <input id=\"description\" name=\"description\" value=\"{description}\">\n\
         <p><button type=\"submit\">Save</button> <a href=\"/devices\">Cancel</a></p>\n\
         </form>\n",
        alerts = alerts(messages),
    );

    layout(title, user, &body)
}

/// Standalone error page; rendered without identity details.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let body = format!(
        "<p>{}</p>\n<p><a href=\"/\">Back to start</a></p>\n",
        escape(message)
    );
    document(&title, "", &body)
}
