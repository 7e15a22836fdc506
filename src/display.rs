//! Status screen: scrolling pulse trace, BPM and stress label.

use core::fmt::Write as _;

use embedded_graphics::{
    mono_font::{ascii, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Polyline, PrimitiveStyle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::config::{WAVEFORM_LEN, WAVEFORM_MAX};
use crate::stress::StressLevel;
use crate::waveform::WaveformBuffer;

/// Landscape ST7789 panel of the board.
pub const DISPLAY_WIDTH: u32 = 240;
pub const DISPLAY_HEIGHT: u32 = 135;

const TRACE_TOP: i32 = 30;
const TRACE_HEIGHT: i32 = 100;

pub fn stress_color(level: StressLevel) -> Rgb565 {
    match level {
        StressLevel::None => Rgb565::CSS_GRAY,
        StressLevel::Low => Rgb565::GREEN,
        StressLevel::Moderate => Rgb565::YELLOW,
        StressLevel::High => Rgb565::CSS_ORANGE,
        StressLevel::VeryHigh => Rgb565::RED,
    }
}

fn trace_points(waveform: &WaveformBuffer) -> heapless::Vec<Point, WAVEFORM_LEN> {
    let max = i32::from(WAVEFORM_MAX);
    waveform
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as i32 * (DISPLAY_WIDTH as i32 - 1) / (WAVEFORM_LEN as i32 - 1);
            let y = TRACE_TOP + (max - i32::from(v)) * (TRACE_HEIGHT - 1) / max;
            Point::new(x, y)
        })
        .collect()
}

fn styled_text(text: &str, x: i32, y: i32, color: Rgb565) -> Text<'_, MonoTextStyle<'static, Rgb565>> {
    let character_style = MonoTextStyle::new(&ascii::FONT_10X20, color);
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Left)
        .baseline(Baseline::Top)
        .build();

    Text::with_text_style(text, Point::new(x, y), character_style, text_style)
}

/// Redraw the whole screen.
pub fn render<D>(
    target: &mut D,
    waveform: &WaveformBuffer,
    bpm: u32,
    stress: StressLevel,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(Rgb565::BLACK)?;

    let mut bpm_text: heapless::String<16> = heapless::String::new();
    // "BPM " plus at most ten digits always fits
    write!(bpm_text, "BPM {}", bpm).ok();
    styled_text(&bpm_text, 4, 4, Rgb565::WHITE).draw(target)?;
    styled_text(stress.name(), 124, 4, stress_color(stress)).draw(target)?;

    let points = trace_points(waveform);
    Polyline::new(&points)
        .into_styled(PrimitiveStyle::with_stroke(Rgb565::CYAN, 1))
        .draw(target)?;

    Ok(())
}

/// Boot splash shown before the first sample arrives.
pub fn render_splash<D>(target: &mut D, message: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(Rgb565::BLACK)?;
    styled_text(message, 4, 56, Rgb565::WHITE).draw(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct CountingTarget {
        cyan: usize,
        red: usize,
        white: usize,
        out_of_bounds: usize,
    }

    impl CountingTarget {
        fn new() -> Self {
            CountingTarget {
                cyan: 0,
                red: 0,
                white: 0,
                out_of_bounds: 0,
            }
        }
    }

    impl OriginDimensions for CountingTarget {
        fn size(&self) -> Size {
            Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
        }
    }

    impl DrawTarget for CountingTarget {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            let area = self.bounding_box();
            for Pixel(p, c) in pixels {
                if !area.contains(p) {
                    self.out_of_bounds += 1;
                } else if c == Rgb565::CYAN {
                    self.cyan += 1;
                } else if c == Rgb565::RED {
                    self.red += 1;
                } else if c == Rgb565::WHITE {
                    self.white += 1;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn trace_spans_screen() {
        let mut w = WaveformBuffer::new();
        for i in 0..WAVEFORM_LEN {
            w.push_raw(if i % 2 == 0 { 0 } else { 1023 });
        }
        let points = trace_points(&w);

        assert_eq!(points.len(), WAVEFORM_LEN);
        assert_eq!(points[0], Point::new(0, TRACE_TOP + TRACE_HEIGHT - 1));
        assert_eq!(points[WAVEFORM_LEN - 1], Point::new(DISPLAY_WIDTH as i32 - 1, TRACE_TOP));
    }

    #[test]
    fn draws_inside_panel() {
        let mut target = CountingTarget::new();
        let mut w = WaveformBuffer::new();
        for i in 0..WAVEFORM_LEN {
            w.push_raw((i as u16 * 37) % 1024);
        }

        render(&mut target, &w, 123, StressLevel::VeryHigh).unwrap();

        assert_eq!(target.out_of_bounds, 0);
        assert!(target.cyan > 0);
        assert!(target.red > 0);
    }

    #[test]
    fn widest_bpm_is_drawn_in_full() {
        let w = WaveformBuffer::new();

        let mut short = CountingTarget::new();
        render(&mut short, &w, 7, StressLevel::None).unwrap();
        let mut widest = CountingTarget::new();
        render(&mut widest, &w, u32::MAX, StressLevel::None).unwrap();

        // "BPM 4294967295" carries nine more glyphs than "BPM 7"
        assert!(widest.white > short.white);
        assert_eq!(widest.out_of_bounds, 0);
    }

    #[test]
    fn splash_fits() {
        let mut target = CountingTarget::new();
        render_splash(&mut target, "Waiting for pulse").unwrap();
        assert_eq!(target.out_of_bounds, 0);
    }
}
