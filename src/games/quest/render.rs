//! Clue Quest rendering.
//!
//! Layout: HUD + main view (map / battle / puzzle / victory) + dialog box
//! (while a message is up) + on-screen pad.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ButtonRow, ClickableList};

use super::actions::*;
use super::battle::{BattlePhase, BattleSession};
use super::logic::{live_props, Mode, QuestSession};
use super::puzzle::PuzzleSession;
use super::world::{PropKind, Terrain, TilePos};

const DIALOG_HEIGHT: u16 = 5;

pub fn render(
    session: &QuestSession,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let dialog_height = if session.dialog().is_visible() { DIALOG_HEIGHT } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(dialog_height),
            Constraint::Length(3),
        ])
        .split(area);

    render_hud(session, f, chunks[0]);

    match session.mode() {
        Mode::Explore => render_map(session, f, chunks[1], false),
        Mode::Fading(_) => render_map(session, f, chunks[1], true),
        Mode::Battle(battle) => render_battle(battle, f, chunks[1], click_state),
        Mode::Puzzle(puzzle) => render_puzzle(puzzle, f, chunks[1], click_state),
        Mode::Victory => render_victory(f, chunks[1], click_state),
    }

    if let Some(message) = session.dialog().message() {
        render_dialog(message, f, chunks[2], click_state);
    }

    render_pad(f, chunks[3], click_state);
}

// ── Helpers ─────────────────────────────────────────────────

fn hp_bar(ratio: f64, width: usize) -> (String, Color) {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    let bar = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(empty);
    let color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    };
    (bar, color)
}

fn borders_for(area_width: u16) -> Borders {
    if is_narrow_layout(area_width) {
        Borders::TOP | Borders::BOTTOM
    } else {
        Borders::ALL
    }
}

fn panel(title: &str, area_width: u16) -> Block<'_> {
    Block::default()
        .borders(borders_for(area_width))
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

// ── HUD ─────────────────────────────────────────────────────

fn render_hud(session: &QuestSession, f: &mut Frame, area: Rect) {
    let quest = session.quest();
    let cap = session.world().config.battle.heart_reward_cap;
    let sep = Span::styled(" │ ", Style::default().fg(Color::DarkGray));

    let mut spans = vec![
        Span::styled(
            session.map().name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        sep.clone(),
        Span::styled(quest.status(), Style::default().fg(Color::Yellow)),
        sep.clone(),
        Span::raw(format!("¥{}", quest.yen_count)),
        sep.clone(),
        Span::raw(format!("Potions {}", session.potions())),
        sep,
        Span::styled(
            format!("♥ {}/{}", quest.hearts_collected, cap),
            Style::default().fg(Color::Red),
        ),
    ];
    if quest.has_cola {
        spans.push(Span::styled(" │ Cola", Style::default().fg(Color::Magenta)));
    }

    let widget = Paragraph::new(Line::from(spans))
        .block(panel("Clue Quest", area.width))
        .wrap(Wrap { trim: true });
    f.render_widget(widget, area);
}

// ── Map ─────────────────────────────────────────────────────

fn terrain_style(t: Terrain) -> Style {
    let fg = match t {
        Terrain::Floor => Color::DarkGray,
        Terrain::Wall => Color::Gray,
        Terrain::Grass => Color::Green,
        Terrain::Water => Color::Blue,
        Terrain::Sand => Color::Yellow,
    };
    Style::default().fg(fg)
}

fn prop_style(what: &PropKind) -> Style {
    let fg = match what {
        PropKind::Sentry { .. } => Color::Red,
        PropKind::Coin { .. } => Color::Yellow,
        PropKind::Package => Color::Magenta,
        _ => Color::Cyan,
    };
    Style::default().fg(fg).add_modifier(Modifier::BOLD)
}

fn render_map(session: &QuestSession, f: &mut Frame, area: Rect, fading: bool) {
    let map = session.map();
    let props: Vec<_> = live_props(map, session.quest()).collect();
    let player = session.nav().display_tile();

    let mut lines = Vec::with_capacity(map.height);
    for y in 0..map.height as i32 {
        let mut spans = Vec::with_capacity(map.width);
        for x in 0..map.width as i32 {
            let pos = TilePos::new(x, y);
            let (glyph, style) = if pos == player {
                ('@', Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            } else if let Some(p) = props.iter().find(|p| p.at == pos) {
                (p.what.glyph(), prop_style(&p.what))
            } else {
                match map.terrain(pos) {
                    Some(t) => (t.glyph(), terrain_style(t)),
                    None => (' ', Style::default()),
                }
            };
            let style = if fading {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
            } else {
                style
            };
            spans.push(Span::styled(glyph.to_string(), style));
        }
        lines.push(Line::from(spans));
    }

    let widget = Paragraph::new(lines)
        .block(panel(&map.name, area.width))
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

// ── Battle ──────────────────────────────────────────────────

fn render_battle(
    battle: &BattleSession,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let bar_width = if is_narrow_layout(area.width) { 12 } else { 20 };
    let mut cl = ClickableList::new();

    let (bar, color) = hp_bar(battle.enemy_hp_ratio(), bar_width);
    cl.push(Line::from(vec![
        Span::styled(
            format!(" {:<14}", battle.enemy_name()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(bar, Style::default().fg(color)),
        Span::raw(format!(" {}/{}", battle.enemy_hp, battle.enemy_max_hp)),
    ]));

    let (bar, color) = hp_bar(battle.player_hp_ratio(), bar_width);
    cl.push(Line::from(vec![
        Span::styled(
            format!(" {:<14}", "You"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(bar, Style::default().fg(color)),
        Span::raw(format!(" {}/{}", battle.player_hp, battle.player_max_hp)),
    ]));
    cl.push(Line::from(Span::styled(
        format!(" Potions: {}", battle.potions),
        Style::default().fg(Color::DarkGray),
    )));
    cl.push(Line::from(""));

    let log = battle.log();
    for entry in &log[log.len().saturating_sub(3)..] {
        cl.push(Line::from(format!(" {}", entry)));
    }
    cl.push(Line::from(""));

    match battle.phase() {
        BattlePhase::PlayerTurn => {
            for (i, action) in battle.actions().iter().enumerate() {
                let selected = i == battle.cursor;
                let marker = if selected { "▶" } else { " " };
                cl.push_clickable(
                    Line::from(Span::styled(
                        format!("{}[{}] {}", marker, i + 1, action.label()),
                        selected_style(selected),
                    )),
                    MENU_BASE + i as u16,
                );
            }
        }
        BattlePhase::Won | BattlePhase::Lost => {}
        BattlePhase::Start | BattlePhase::Animating | BattlePhase::EnemyTurn => {
            cl.push(Line::from(Span::styled(" ...", Style::default().fg(Color::DarkGray))));
        }
    }

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);
    drop(cs);

    let widget = Paragraph::new(cl.into_lines()).block(panel("Battle", area.width));
    f.render_widget(widget, area);
}

// ── Puzzle ──────────────────────────────────────────────────

fn render_puzzle(
    puzzle: &PuzzleSession,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    cl.push(Line::from(format!(" {}", puzzle.prompt())));
    cl.push(Line::from(""));

    for (i, option) in puzzle.options().iter().enumerate() {
        let selected = i == puzzle.cursor;
        let marker = if selected { "▶" } else { " " };
        cl.push_clickable(
            Line::from(Span::styled(
                format!("{}[{}] {}", marker, i + 1, option),
                selected_style(selected),
            )),
            MENU_BASE + i as u16,
        );
    }

    cl.push(Line::from(""));
    if let Some(feedback) = puzzle.feedback() {
        cl.push(Line::from(Span::styled(
            format!(" {}", feedback),
            Style::default().fg(Color::Yellow),
        )));
    }
    cl.push_clickable(
        Line::from(Span::styled(" [X] Leave", Style::default().fg(Color::DarkGray))),
        PAD_CANCEL,
    );

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);
    drop(cs);

    let widget = Paragraph::new(cl.into_lines()).block(panel(puzzle.title(), area.width));
    f.render_widget(widget, area);
}

// ── Victory ─────────────────────────────────────────────────

fn render_victory(f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let mut cl = ClickableList::new();
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        "★ The package opens! ★",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(""));
    cl.push(Line::from("Inside lies a postcard from every place you visited."));
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled("[Z] Play again", Style::default().fg(Color::Cyan))),
        PAD_CONFIRM,
    );

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);
    drop(cs);

    let widget = Paragraph::new(cl.into_lines())
        .block(panel("Congratulations", area.width))
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

// ── Dialog ──────────────────────────────────────────────────

fn render_dialog(message: &str, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text_area = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1));
    f.render_widget(
        Paragraph::new(message.to_string()).wrap(Wrap { trim: true }),
        text_area,
    );

    let mut cs = click_state.borrow_mut();
    // Anywhere on the box confirms.
    cs.add_click_target(area, PAD_CONFIRM);
    if inner.height > 0 {
        let hint_row = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
        ButtonRow::new(" ")
            .button("[Z] OK", Style::default().fg(Color::Cyan), PAD_CONFIRM)
            .render(f, hint_row, &mut cs);
    }
}

// ── Pad ─────────────────────────────────────────────────────

fn render_pad(f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let block = Block::default()
        .borders(borders_for(area.width))
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let arrow = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let a = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let b = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);

    let mut cs = click_state.borrow_mut();
    ButtonRow::new(" ")
        .button("[←]", arrow, PAD_LEFT)
        .button("[↑]", arrow, PAD_UP)
        .button("[↓]", arrow, PAD_DOWN)
        .button("[→]", arrow, PAD_RIGHT)
        .button("  [Z] A", a, PAD_CONFIRM)
        .button("[X] B", b, PAD_CANCEL)
        .render(f, inner, &mut cs);
}
