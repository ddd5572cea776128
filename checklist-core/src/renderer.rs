use crate::markdown::ChecklistItem;

/// Render checklist items as numbered step blocks, starting at 1.
pub fn render_checklist(items: &[ChecklistItem]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        lines.push(format!(
            "<div class=\"checklist-item\" data-step=\"{}\">",
            index + 1
        ));
        lines.push("    <div class=\"checkbox\"></div>".to_string());
        lines.push("    <div class=\"item-content\">".to_string());
        lines.push(format!("        <div class=\"item-text\">{}</div>", item.text));

        for sub_item in &item.sub_items {
            lines.push(format!("        <div class=\"sub-item\">{}</div>", sub_item));
        }

        lines.push("    </div>".to_string());
        lines.push("</div>".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse_checklist;

    #[test]
    fn test_single_item_block() {
        let items = parse_checklist("- [ ] Step one\n  - Sub A");
        let html = render_checklist(&items);

        assert_eq!(
            html,
            "<div class=\"checklist-item\" data-step=\"1\">\n\
             \x20   <div class=\"checkbox\"></div>\n\
             \x20   <div class=\"item-content\">\n\
             \x20       <div class=\"item-text\">Step one</div>\n\
             \x20       <div class=\"sub-item\">Sub A</div>\n\
             \x20   </div>\n\
             </div>"
        );
    }

    #[test]
    fn test_steps_are_contiguous() {
        let items = parse_checklist("- [ ] a\n\n\n  - x\n\n- [ ] b\nnoise\n\n- [ ] c");
        let html = render_checklist(&items);

        for step in 1..=3 {
            assert!(html.contains(&format!("data-step=\"{}\"", step)));
        }
        assert!(!html.contains("data-step=\"4\""));
        assert!(!html.contains("data-step=\"0\""));
    }

    #[test]
    fn test_empty_checklist() {
        assert_eq!(render_checklist(&[]), "");
    }
}
