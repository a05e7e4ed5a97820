use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Block, BorderType, Borders, Clear, Padding, Row, Table, Widget},
};

use crate::config::{key_event_to_string, PageKeyBindings};

/// Overlay listing key bindings, one bordered table per group.
#[derive(Debug)]
pub struct Help {
    keybinding_groups: Vec<(String, Vec<(String, String)>)>,
    column_spacing: u16,
    margin_vertical: u16,
    margin_horizontal: u16,
}

impl Help {
    pub fn new(keybinding_groups: Vec<(String, &PageKeyBindings)>) -> Self {
        let groups = keybinding_groups
            .into_iter()
            .map(|(group_name, keybindings)| {
                let mut keybindings: Vec<(String, String)> =
                    keybindings.iter().map(|(event, action)| (key_event_to_string(event), action.label())).collect();
                keybindings.sort_by(|(ka, va), (kb, vb)| va.cmp(vb).then(ka.cmp(kb)));
                (group_name, keybindings)
            })
            .collect();

        Self { keybinding_groups: groups, column_spacing: 3, margin_vertical: 1, margin_horizontal: 2 }
    }

    pub fn groups(&self) -> &[(String, Vec<(String, String)>)] {
        &self.keybinding_groups
    }

    fn render_group(
        &self,
        area: Rect,
        buf: &mut Buffer,
        group_name: &str,
        keybindings: &[(String, String)],
        key_length: u16,
        val_length: u16,
    ) {
        let rows: Vec<Row> = keybindings.iter().map(|(key, val)| Row::new(vec![key.clone(), val.clone()])).collect();

        let table = Table::new(rows, [Constraint::Length(key_length), Constraint::Min(val_length)])
            .column_spacing(self.column_spacing)
            .header(Row::new(vec!["Key", "Action"]).style(Style::new().bold()).bottom_margin(1))
            .block(
                Block::new()
                    .title(group_name.to_string())
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::new().bold().fg(Color::Cyan))
                    .padding(Padding::symmetric(self.margin_horizontal, self.margin_vertical)),
            );

        Clear.render(area, buf);
        table.render(area, buf);
    }
}

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self.keybinding_groups.iter().flat_map(|(_, bindings)| bindings.iter());
        let key_length = rows.clone().map(|(key, _)| key.len()).max().unwrap_or(0) as u16;
        let val_length = rows.map(|(_, val)| val.len()).max().unwrap_or(0) as u16;

        // columns + spacing + padding + border
        let width = key_length + val_length + self.column_spacing + (self.margin_horizontal * 2) + 2;
        // rows + padding + header + border
        let heights = self
            .keybinding_groups
            .iter()
            .map(|(_, bindings)| Constraint::Length(bindings.len() as u16 + (self.margin_vertical * 2) + 2 + 2));

        let [area] = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center).areas(area);
        let areas = Layout::vertical(heights).flex(Flex::Center).split(area);

        for ((group_name, bindings), area) in self.keybinding_groups.iter().zip(areas.iter()) {
            self.render_group(*area, buf, group_name, bindings, key_length, val_length);
        }
    }
}
