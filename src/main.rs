mod app;
mod braille;
mod map;
mod ui;

use anyhow::Result;
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::time::Duration;
use waste_dashboard::{logging, Config, DataContext};

fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init_file(&config.log_path)?;
    config.report_rejected();

    // Both files must load before the terminal switches to the alternate screen
    let ctx = DataContext::load_with_boundaries(&config)?;
    tracing::info!(
        districts = ctx.table.len(),
        shapes = ctx.boundaries.as_ref().map_or(0, |b| b.len()),
        "map dashboard starting"
    );

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &ctx);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for selecting, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for hover and cursor marker
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click selects, drag pans
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(mouse.column, mouse.row),
        MouseEventKind::Down(MouseButton::Right) => app.clear_selection(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, ctx: &DataContext) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(ctx, size.width, size.height);

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Nothing animates, so the loop only wakes for input
        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                    // Zoom
                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    // District selection from the keyboard
                    KeyCode::Tab | KeyCode::Char('n') => app.cycle_district(1),
                    KeyCode::BackTab | KeyCode::Char('p') => app.cycle_district(-1),
                    KeyCode::Char('u') => app.clear_selection(),

                    // Layer toggles
                    KeyCode::Char('f') | KeyCode::Char('F') => app.map_renderer.toggle_fill(),
                    KeyCode::Char('o') | KeyCode::Char('O') => app.map_renderer.toggle_outlines(),
                    KeyCode::Char('L') => app.map_renderer.toggle_labels(),

                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    tracing::info!("map dashboard closed");
    Ok(())
}
