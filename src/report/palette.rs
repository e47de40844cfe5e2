//! Overlay colors for selected customers.

/// Plain 8-bit RGB; front-ends convert to their own color types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Manual applicant polygon color (teal).
pub const MANUAL_COLOR: Rgb = Rgb(0x0d, 0x94, 0x88);

const BASE_COLORS: [Rgb; 8] = [
    Rgb(0x25, 0x63, 0xeb),
    Rgb(0xdc, 0x26, 0x26),
    Rgb(0x16, 0xa3, 0x4a),
    Rgb(0xf5, 0x9e, 0x0b),
    Rgb(0x8b, 0x5c, 0xf6),
    Rgb(0xec, 0x48, 0x99),
    Rgb(0x06, 0xb6, 0xd4),
    Rgb(0x84, 0xcc, 0x16),
];

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// Color for the `index`-th selected customer.
///
/// The first eight come from a fixed palette; after that hues are spread with
/// the golden ratio so neighbouring indices stay distinguishable.
pub fn customer_color(index: usize) -> Rgb {
    if let Some(c) = BASE_COLORS.get(index) {
        return *c;
    }
    let hue = (index as f64 * GOLDEN_RATIO_CONJUGATE * 360.0) % 360.0;
    let saturation = 60.0 + (index % 3) as f64 * 10.0;
    let lightness = 45.0 + ((index / 3) % 3) as f64 * 5.0;
    hsl_to_rgb(hue, saturation / 100.0, lightness / 100.0)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb(channel(r), channel(g), channel(b))
}
