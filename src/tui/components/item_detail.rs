//! # Item Detail Component
//!
//! Right column: facts about the entry under the cursor and which image
//! the terminal would show for it. Stateless.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::core::images::{ImageCache, ImageSource};
use crate::core::item::EquippableItem;
use crate::tui::component::Component;

pub struct ItemDetail<'a> {
    pub item: Option<&'a EquippableItem>,
    pub images: &'a ImageCache,
    /// Name shown in the heading; a custom kit's name differs from its preview item.
    pub heading: Option<&'a str>,
}

impl ItemDetail<'_> {
    fn image_line(&self, item: &EquippableItem) -> Line<'static> {
        let (text, color) = match self.images.resolve(item) {
            ImageSource::Full(bytes) => (format!("full image ({} bytes)", bytes.len()), Color::Green),
            ImageSource::Embedded(_) if self.images.has_failed(&item.id) => {
                (String::from("preview (full image unavailable)"), Color::Yellow)
            }
            ImageSource::Embedded(_) if item.image_path.is_some() => {
                (String::from("preview, loading full image..."), Color::Yellow)
            }
            ImageSource::Embedded(_) => (String::from("preview"), Color::Yellow),
            ImageSource::Missing => (String::from("no image"), Color::DarkGray),
        };
        Line::from(vec![
            Span::styled("Image   ", Style::default().fg(Color::DarkGray)),
            Span::styled(text, Style::default().fg(color)),
        ])
    }
}

fn field(name: &'static str, value: Option<&str>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name:<8}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value.unwrap_or("-").to_string()),
    ])
}

impl Component for ItemDetail<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Details ");

        let Some(item) = self.item else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let heading = self.heading.unwrap_or(item.display_name()).to_string();
        let cross_core = if item.is_cross_core { "yes" } else { "no" };
        let lines = vec![
            Line::from(Span::styled(
                heading,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            field("Id", Some(&item.id)),
            field("Type", Some(item.kind.type_name())),
            field("Rarity", item.rarity.as_deref()),
            field("Core", item.belongs_to_core.as_deref()),
            field("Cross", Some(cross_core)),
            self.image_line(item),
        ];

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slot::SlotKind;
    use crate::test_support::item_with_image;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(detail: &mut ItemDetail<'_>) -> String {
        let backend = TestBackend::new(50, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| detail.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_failed_full_image_shows_preview() {
        let mut helmet = item_with_image("H1", SlotKind::ArmorHelmet, "aDE=");
        helmet.image_path = Some("helmets/h1.png".into());
        let mut cache = ImageCache::new();
        cache.store("H1", None);

        let text = rendered(&mut ItemDetail {
            item: Some(&helmet),
            images: &cache,
            heading: None,
        });
        assert!(text.contains("H1"));
        assert!(text.contains("full image unavailable"));
    }

    #[test]
    fn test_full_image_reported() {
        let helmet = item_with_image("H1", SlotKind::ArmorHelmet, "aDE=");
        let mut cache = ImageCache::new();
        cache.store("H1", Some(vec![0; 42]));

        let text = rendered(&mut ItemDetail {
            item: Some(&helmet),
            images: &cache,
            heading: Some("Night Ops"),
        });
        assert!(text.contains("Night Ops"));
        assert!(text.contains("42 bytes"));
    }
}
