use colored::Colorize;
use declarative::{Diagnostic, Diagnostics, PlannedAction, ResourceDiff, Severity};
use outpost::model::REDACTED;
use outpost::{ClusterRecord, RemoteRecord, redact_attribute};
use serde_json::Value;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Values
// ============================================================================

const MAX_VALUE_LEN: usize = 60;

/// Render an attribute value for the terminal, secrets masked
pub fn format_value(attribute: &str, value: &Value, sensitive: bool) -> String {
    if sensitive && !value.is_null() {
        return REDACTED.to_string();
    }
    let rendered = match redact_attribute(attribute, value) {
        Value::Null => "(none)".to_string(),
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    };
    truncate(&rendered, MAX_VALUE_LEN)
}

/// Truncate a string for display, keeping the start
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Display planned changes
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!("┌─ {} ─────────────────────────────────────────┐", "Outpost Plan".bold());
    println!("│");

    for diff in diffs {
        let symbol = match diff.action {
            PlannedAction::Create => "+".green(),
            PlannedAction::Delete => "-".red(),
            PlannedAction::Update { .. } => "~".yellow(),
            PlannedAction::NoChange => " ".normal(),
        };
        let verb = match diff.action {
            PlannedAction::Create => "will be created",
            PlannedAction::Delete => "will be deleted",
            PlannedAction::Update { .. } => "will be updated in place",
            PlannedAction::NoChange => "unchanged",
        };
        println!("│ {} {} {}", symbol, diff.address.bold(), verb.dimmed());

        for change in &diff.changes {
            let before = format_value(&change.name, &change.before, change.sensitive);
            let after = format_value(&change.name, &change.after, change.sensitive);
            let line = match diff.action {
                PlannedAction::Create => after,
                PlannedAction::Delete => before,
                _ => format!("{before} → {after}"),
            };
            println!("│     {:<24} {}", change.name, line.dimmed());
        }
        println!("│");
    }

    let summary = declarative::DiffSummary::from_diffs(diffs);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} to add, {} to change, {} to delete",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

// ============================================================================
// Diagnostics
// ============================================================================

fn diagnostic(address: &str, d: &Diagnostic) {
    let attribute = d
        .attribute
        .as_deref()
        .map(|a| format!(" [{a}]"))
        .unwrap_or_default();
    let line = format!("{}: {}{}", address, d.summary, attribute);
    match d.severity {
        Severity::Error => error(&line),
        Severity::Warning => warn(&line),
    }
    if let Some(detail) = &d.detail {
        for detail_line in detail.lines() {
            if d.is_error() {
                eprintln!("    {}", detail_line.dimmed());
            } else {
                dim(&format!("  {detail_line}"));
            }
        }
    }
}

/// Print every diagnostic of one instance
pub fn diagnostics(address: &str, diagnostics: &Diagnostics) {
    for d in diagnostics {
        diagnostic(address, d);
    }
}

// ============================================================================
// Records
// ============================================================================

/// Print a mapped outpost record, secrets redacted
pub fn record(record: &RemoteRecord) {
    let record = record.redacted();

    header(&format!("Outpost {}", record.name));
    kv("id", &record.id);
    kv("provider", &record.kind().map_or_else(|| "unknown".to_string(), |k| k.to_string()));
    kv("enabled", &record.enabled.to_string());
    let status = match record.status.error_code.as_deref() {
        Some(code) => format!("{} ({})", record.status.status, code.red()),
        None => record.status.status.clone(),
    };
    kv("status", &status);
    if !record.service_type.is_empty() {
        kv("service type", &record.service_type);
    }
    if !record.allowed_regions.is_empty() {
        kv("allowed regions", &record.allowed_regions.join(", "));
    }
    if !record.external_internet_access.is_empty() {
        kv("external internet access", &record.external_internet_access);
    }
    if let Some(created) = record.created_at {
        kv("created", &created.to_rfc3339());
    }
    if !record.added_by.email.is_empty() || !record.added_by.name.is_empty() {
        kv("added by", &attribution(&record.added_by.name, &record.added_by.email));
    }

    if let Some(config) = &record.config {
        section("Provider config");
        for (key, value) in config.to_fields() {
            kv(&key, &format_value(&key, &value, false));
        }
    }

    if let Some(self_managed) = &record.self_managed_config {
        section("Self-managed config");
        kv("image repository", &self_managed.image_repository);
        if let Some(version) = &self_managed.version {
            kv("version", &version.id);
        }
        kv(
            "bucket sync",
            if self_managed.disable_automatic_configuration_bucket_sync {
                "disabled"
            } else {
                "automatic"
            },
        );
    }

    section(&format!("Clusters ({})", record.clusters.len()));
    if record.clusters.is_empty() {
        dim("none");
    }
    for cluster in &record.clusters {
        print_cluster(cluster);
    }
}

fn attribution(name: &str, email: &str) -> String {
    match (name.is_empty(), email.is_empty()) {
        (false, false) => format!("{name} <{email}>"),
        (false, true) => name.to_string(),
        _ => email.to_string(),
    }
}

fn print_cluster(cluster: &ClusterRecord) {
    let name = cluster
        .config
        .as_ref()
        .map(|c| c.cluster_name())
        .filter(|n| !n.is_empty())
        .unwrap_or("(unnamed)");
    println!("  {} {} {}", "•".cyan(), name.bold(), format!("{} {}", cluster.id, cluster.region).dimmed());
    if let Some(config) = &cluster.config {
        dim(&format!("  {} cluster", config.kind()));
    }
    for group in &cluster.node_groups {
        dim(&format!(
            "  node group {} ({}): {}-{} nodes",
            group.node_group_id, group.node_type, group.min_node_count, group.max_node_count
        ));
    }
    if let Some(proxy) = &cluster.http_proxy {
        let url = [&proxy.https_proxy_url, &proxy.http_proxy_url]
            .into_iter()
            .find(|u| !u.is_empty());
        if let Some(url) = url {
            dim(&format!("  proxy {url}"));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
