#[macro_use]
extern crate bencher;

extern crate lvimg;
use lvimg::prelude::*;

use bencher::Bencher;


/// A synthetic icon: flat areas with a few noisy rows, like typical user interface graphics.
fn icon_data() -> Vec<u8> {
    let mut data = Vec::with_capacity(256 * 256 * 2);

    for y in 0 .. 256_u32 {
        for x in 0 .. 256_u32 {
            let color: u16 = if y % 32 < 4 { (x * y % 65521) as u16 } else if x < 128 { 0xf800 } else { 0x001f };
            data.extend_from_slice(&color.to_le_bytes());
        }
    }

    data
}

fn compress_rle(bench: &mut Bencher) {
    let data = icon_data();
    let compression = Compression::new(CompressMethod::Rle);

    bench.iter(||{
        let payload = compression.compress(&data, 2).unwrap();
        bencher::black_box(payload);
    })
}

fn compress_lz4(bench: &mut Bencher) {
    let data = icon_data();
    let compression = Compression::new(CompressMethod::Lz4);

    bench.iter(||{
        let payload = compression.compress(&data, 2).unwrap();
        bencher::black_box(payload);
    })
}

fn decompress_rle(bench: &mut Bencher) {
    let payload = Compression::new(CompressMethod::Rle).compress(&icon_data(), 2).unwrap();

    bench.iter(||{
        let data = payload.decompress(2).unwrap();
        bencher::black_box(data);
    })
}

fn write_and_read_bin(bench: &mut Bencher) {
    let image = Image::from_data(ColorFormat::Rgb565, 256, 256, icon_data(), 0).unwrap();

    bench.iter(||{
        let bytes = image.to_bin_bytes(CompressMethod::Rle).unwrap();
        let image = Image::from_bin_bytes(&bytes).unwrap();
        bencher::black_box(image);
    })
}

benchmark_group!(compress,
    compress_rle,
    compress_lz4,
    decompress_rle,
    write_and_read_bin
);

benchmark_main!(compress);
