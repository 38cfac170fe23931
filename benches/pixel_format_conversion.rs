#[macro_use]
extern crate bencher;

extern crate lvimg;
use lvimg::prelude::*;
use lvimg::pixel::{self, Packer};

use bencher::Bencher;


const WIDTH: usize = 320;
const HEIGHT: usize = 240;

fn rgba_pixels() -> Vec<u8> {
    (0 .. WIDTH * HEIGHT)
        .flat_map(|index| vec![ index as u8, (index / WIDTH) as u8, (index * 3) as u8, (index % 255) as u8 ])
        .collect()
}

fn pack(format: ColorFormat, dither: bool, bench: &mut Bencher) {
    let rgba = rgba_pixels();
    let packer = Packer::new(format, Background(0x20_40_60), dither).unwrap();

    bench.iter(||{
        let data = packer.pack_image(&rgba, WIDTH, HEIGHT);
        bencher::black_box(data);
    })
}

fn pack_rgb565(bench: &mut Bencher) { pack(ColorFormat::Rgb565, false, bench) }
fn pack_rgb565_dithered(bench: &mut Bencher) { pack(ColorFormat::Rgb565, true, bench) }
fn pack_rgb565a8(bench: &mut Bencher) { pack(ColorFormat::Rgb565A8, false, bench) }
fn pack_luma(bench: &mut Bencher) { pack(ColorFormat::L8, false, bench) }
fn pack_alpha_2(bench: &mut Bencher) { pack(ColorFormat::A2, false, bench) }

fn unpack_argb8565(bench: &mut Bencher) {
    let packer = Packer::new(ColorFormat::Argb8565, Background::BLACK, false).unwrap();
    let data = packer.pack_image(&rgba_pixels(), WIDTH, HEIGHT);

    bench.iter(||{
        let samples = pixel::unpack(&data, ColorFormat::Argb8565, WIDTH).unwrap();
        bencher::black_box(samples);
    })
}

fn premultiply_argb8888(bench: &mut Bencher) {
    let packer = Packer::new(ColorFormat::Argb8888, Background::BLACK, false).unwrap();
    let image = Image::from_data(ColorFormat::Argb8888, WIDTH, HEIGHT, packer.pack_image(&rgba_pixels(), WIDTH, HEIGHT), 0).unwrap();

    bench.iter(||{
        let mut image = image.clone();
        image.premultiply().unwrap();
        bencher::black_box(image);
    })
}

fn adjust_stride_rgb888(bench: &mut Bencher) {
    let packer = Packer::new(ColorFormat::Rgb888, Background::BLACK, false).unwrap();
    let image = Image::from_data(ColorFormat::Rgb888, WIDTH, HEIGHT, packer.pack_image(&rgba_pixels(), WIDTH, HEIGHT), 0).unwrap();

    bench.iter(||{
        let mut image = image.clone();
        image.adjust_stride(0, 64).unwrap();
        bencher::black_box(image);
    })
}

benchmark_group!(pixel_format_conversion,
    pack_rgb565,
    pack_rgb565_dithered,
    pack_rgb565a8,
    pack_luma,
    pack_alpha_2,
    unpack_argb8565,
    premultiply_argb8888,
    adjust_stride_rgb888
);

benchmark_main!(pixel_format_conversion);
