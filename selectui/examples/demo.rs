use std::fs::File;
use std::io::{stdout, Write};
use std::time::Duration;

use crossterm::event::{
    poll, read, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use simplelog::{Config, LevelFilter, WriteLogger};

use selectui::select::class;
use selectui::{Element, LayoutResult, Rect, Select, SelectConfig};

fn main() -> std::io::Result<()> {
    let _ = WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create("demo.log")?,
    );

    let source = Element::box_()
        .id("flavor")
        .attr("name", "flavor")
        .attr("tabindex", "0")
        .child(Element::text("Vanilla").attr("value", "vanilla"))
        .child(Element::text("Chocolate").attr("value", "chocolate").attr("selected", ""))
        .child(Element::text("Pistachio").attr("value", "pistachio"));

    let mut root = Element::box_().id("app").child(source);

    let mut select = Select::from_selector(
        &root,
        "flavor",
        SelectConfig {
            on_select: Some(Box::new(|selection| {
                log::info!("selected {selection:?}");
            })),
            close_on_outside_click: true,
            ..SelectConfig::default()
        },
    )
    .expect("demo source resolves");
    select.replace_in(&mut root);

    let layout = demo_layout(&select);

    enable_raw_mode()?;
    execute!(stdout(), EnableMouseCapture)?;

    let mut out = stdout();
    write!(out, "selectui demo - Enter opens, arrows move, q quits\r\n")?;
    status(&mut out, &select)?;

    loop {
        if !poll(Duration::from_millis(100))? {
            continue;
        }
        let raw = read()?;
        if let CrosstermEvent::Key(key) = &raw {
            if key.code == KeyCode::Char('q') {
                break;
            }
        }

        for selection in select.process_events(&[raw], &root, &layout) {
            write!(
                out,
                "committed {:?} (value {:?}, index {})\r\n",
                selection.content, selection.value, selection.index
            )?;
        }
        select.tick(&mut root);
        status(&mut out, &select)?;
    }

    execute!(stdout(), DisableMouseCapture)?;
    disable_raw_mode()?;
    Ok(())
}

fn status(out: &mut impl Write, select: &Select) -> std::io::Result<()> {
    write!(
        out,
        "open={} index={:?} value={:?} focused={:?} {}={}\r\n",
        select.is_open(),
        select.index(),
        select.value(),
        select.focused(),
        class::OPEN,
        select.view().has_class(class::OPEN),
    )?;
    out.flush()
}

/// Hand-built geometry: trigger on row 0, option rows stacked beneath it,
/// all sized to the widest option.
fn demo_layout(select: &Select) -> LayoutResult {
    let width = select.intrinsic_width().max(10) + 2;
    let mut layout = LayoutResult::new();
    layout.insert(select.root_id().to_string(), Rect::new(0, 0, width, 6));
    layout.insert(select.trigger_id().to_string(), Rect::new(0, 0, width, 1));
    layout.insert(
        select.options_id().to_string(),
        Rect::new(0, 1, width, select.option_count() as u16),
    );
    for (row, id) in select.option_ids().iter().enumerate() {
        layout.insert(id.clone(), Rect::new(0, 1 + row as u16, width, 1));
    }
    layout
}
