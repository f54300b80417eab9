//! Screen and terminal benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vtgrid::core::{EraseMode, Screen};
use vtgrid::Terminal;

fn bench_screen_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    let text: Vec<char> = "Hello, World! ".repeat(200).chars().collect();
    group.throughput(Throughput::Elements(text.len() as u64));

    group.bench_function("print_wrapping", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24).unwrap();
            for &ch in &text {
                screen.print(ch);
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("linefeed_scroll", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24).unwrap();
            for _ in 0..1000 {
                screen.print('x');
                screen.carriage_return();
                screen.linefeed();
            }
            black_box(screen)
        })
    });

    group.bench_function("region_scroll", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24).unwrap();
            screen.set_scroll_region(4, 19);
            for _ in 0..200 {
                screen.scroll_up(3);
                screen.scroll_down(2);
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("erase_display", |b| {
        b.iter(|| {
            let mut screen = Screen::new(200, 60).unwrap();
            for _ in 0..50 {
                screen.move_cursor_to(30, 100);
                screen.erase_in_display(EraseMode::ToEnd);
                screen.erase_in_display(EraseMode::All);
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_terminal_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("terminal");

    // Roughly what a full-screen program redraw looks like
    let mut redraw = String::from("\x1b[?1049h\x1b[H\x1b[2J");
    for row in 1..=24 {
        redraw.push_str(&format!(
            "\x1b[{};1H\x1b[1;3{}mrow {:02}\x1b[0m \x1b[38;5;{}m{}\x1b[K",
            row,
            row % 8,
            row,
            row * 9,
            "status ".repeat(9)
        ));
    }
    redraw.push_str("\x1b[?1049l");
    let input = redraw.repeat(20);
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("full_redraw", |b| {
        b.iter(|| {
            let mut term = Terminal::new(80, 24, 0).unwrap();
            term.append(black_box(input.as_bytes())).unwrap();
            black_box(term)
        })
    });

    let log = "[INFO] request handled in 3ms\r\n".repeat(2000);
    group.throughput(Throughput::Bytes(log.len() as u64));

    group.bench_function("scrolling_log", |b| {
        b.iter(|| {
            let mut term = Terminal::new(80, 24, 0).unwrap();
            term.append(black_box(log.as_bytes())).unwrap();
            black_box(term)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_screen_print,
    bench_screen_scroll,
    bench_screen_erase,
    bench_terminal_append
);

criterion_main!(benches);
