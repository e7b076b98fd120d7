use console::Style;
use folio_core::attachment::{AttachmentMeta, RenderPlan};
use folio_core::transform::TransformState;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    category: Style,
    dim: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            category: Style::new().green(),
            dim: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

/// Extra facts known only after fetching.
pub struct Resolved {
    pub content_type: Option<String>,
    pub size: Option<u64>,
}

pub fn print_meta(meta: &AttachmentMeta, resolved: Option<&Resolved>) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to(&meta.resolved_display_name));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Category"),
        s.category.apply_to(meta.category)
    );
    let extension = if meta.extension.is_empty() {
        s.dim.apply_to("unknown".to_string())
    } else {
        s.value.apply_to(meta.extension.clone())
    };
    println!("    {:<12}{}", s.label.apply_to("Extension"), extension);
    if let Some(url) = &meta.resolved_url {
        println!("    {:<12}{}", s.label.apply_to("Locator"), s.path.apply_to(url));
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Revocable"),
        s.value.apply_to(if meta.must_revoke_handle { "yes" } else { "no" })
    );

    let plan = match meta.render_plan() {
        RenderPlan::Image => "image view".to_string(),
        RenderPlan::Document => "document (page 1)".to_string(),
        RenderPlan::Video => "external video".to_string(),
        RenderPlan::Audio => "external audio".to_string(),
        RenderPlan::Text => "text view".to_string(),
        RenderPlan::Passthrough(_) => "embedded passthrough".to_string(),
        RenderPlan::DownloadOnly => "download only".to_string(),
    };
    println!("    {:<12}{}", s.label.apply_to("Renders as"), s.value.apply_to(plan));

    if let Some(resolved) = resolved {
        let content_type = resolved.content_type.as_deref().unwrap_or("undetected");
        println!(
            "    {:<12}{}",
            s.label.apply_to("Detected"),
            s.value.apply_to(content_type)
        );
        if let Some(size) = resolved.size {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Size"),
                s.value.apply_to(folio_core::attachment::format_size(size))
            );
        }
    }
}

pub fn print_geometry(t: &TransformState) {
    let s = Styles::new();
    let available = t.available_area();
    let bound = t.pan_bound();
    let rt = t.render_transform();

    println!();
    println!("  {}", s.title.apply_to("Viewer Geometry"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    if let Some(displayed) = t.displayed_size() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Displayed"),
            s.value.apply_to(format!("{:.0} x {:.0}", displayed.w, displayed.h))
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Available"),
        s.value.apply_to(format!("{:.0} x {:.0}", available.w, available.h))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Rotation"),
        s.value.apply_to(t.rotation())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Zoom"),
        s.value.apply_to(format!("{:.0}%", t.zoom_percent()))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Base scale"),
        s.value.apply_to(format!("{:.4}", t.base_scale()))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Effective"),
        s.value.apply_to(format!("{:.4}", t.effective_scale()))
    );
    if let Some(drawn) = rt.drawn_size {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Drawn"),
            s.value.apply_to(format!("{:.1} x {:.1}", drawn.w, drawn.h))
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Pan bound"),
        s.value.apply_to(format!("\u{00b1}{:.1}, \u{00b1}{:.1}", bound.x, bound.y))
    );
    let pan = if t.pan_enabled() {
        s.category.apply_to("enabled")
    } else {
        s.dim.apply_to("disabled (zoom <= 100%)")
    };
    println!("  {:<14}{}", s.label.apply_to("Pan"), pan);
    println!();
}
