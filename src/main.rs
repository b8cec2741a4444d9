mod games;
mod input;
mod logging;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use games::quest::world::World;
use games::quest::QuestGame;
use games::Game;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent, NavKey};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use time::GameTime;

/// Map a click in page pixels to a terminal cell via the grid container's
/// bounding rect.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend renders into a <div> directly under <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    tracing::debug!(col, row, targets = cs.targets.len(), "click");
    Some((col, row))
}

fn input_for_key(code: KeyCode) -> Option<InputEvent> {
    let event = match code {
        KeyCode::Up => InputEvent::Nav(NavKey::Up),
        KeyCode::Down => InputEvent::Nav(NavKey::Down),
        KeyCode::Left => InputEvent::Nav(NavKey::Left),
        KeyCode::Right => InputEvent::Nav(NavKey::Right),
        KeyCode::Enter => InputEvent::Nav(NavKey::Confirm),
        KeyCode::Esc | KeyCode::Backspace => InputEvent::Nav(NavKey::Cancel),
        KeyCode::Char(c) => InputEvent::Key(c),
        _ => return None,
    };
    Some(event)
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init();

    let world = World::builtin().map_err(|e| {
        tracing::error!(error = %e, "world data rejected");
        io::Error::new(io::ErrorKind::InvalidData, e.to_string())
    })?;
    let clock = GameTime::new(world.config.ticks_per_sec);
    let seed = js_sys::Date::now() as u64;

    let game: Rc<RefCell<Box<dyn Game>>> =
        Rc::new(RefCell::new(Box::new(QuestGame::new(world, seed, clock.tick_ms()))));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let action = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                .and_then(|(col, row)| cs.hit_test(col, row));
            drop(cs);

            if let Some(id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let Some(event) = input_for_key(key_event.code) {
                game.borrow_mut().handle_input(&event);
            }
        }
    });

    let clock = RefCell::new(clock);
    terminal.draw_web(move |f| {
        let ticks = clock.borrow_mut().update(now_ms());
        game.borrow_mut().tick(ticks);

        let area = f.area();
        {
            let mut cs = click_state.borrow_mut();
            cs.terminal_cols = area.width;
            cs.terminal_rows = area.height;
            cs.clear_targets();
        }

        game.borrow().render(f, area, &click_state);
    });

    Ok(())
}
