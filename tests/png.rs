
extern crate lvimg;

use std::cell::Cell;
use std::path::PathBuf;

use lvimg::prelude::*;


fn encode(width: u32, height: u32, color: png::ColorType, depth: png::BitDepth, palette: Option<Vec<u8>>, data: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();

    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        if let Some(palette) = palette { encoder.set_palette(palette); }

        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
        writer.finish().unwrap();
    }

    bytes
}

fn decode_rgba(bytes: &[u8]) -> Vec<u8> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::EXPAND);

    let mut reader = decoder.read_info().unwrap();
    let mut buffer = vec![ 0; reader.output_buffer_size() ];
    let info = reader.next_frame(&mut buffer).unwrap();
    assert_eq!(info.color_type, png::ColorType::Rgba);

    buffer.truncate(info.buffer_size());
    buffer
}

fn no_quantizer(_: &[u8], _: usize) -> Result<Vec<u8>> {
    panic!("quantizer must not be invoked")
}

fn temporary_directory(name: &str) -> PathBuf {
    std::env::temp_dir().join("lvimg-tests").join(name)
}

fn gradient(width: u32, height: u32) -> Vec<u8> {
    (0 .. width * height)
        .flat_map(|index| {
            let value = (index * 7 % 256) as u8;
            vec![ value, 255 - value, value / 2, (index * 13 % 256) as u8 ]
        })
        .collect()
}


#[test]
fn truecolor_alpha_survives(){
    let rgba = gradient(5, 3);
    let png = encode(5, 3, png::ColorType::Rgba, png::BitDepth::Eight, None, &rgba);

    let options = PngImportOptions::default().with_format(ColorFormat::Argb8888);
    let image = Image::from_png_bytes(&png, options, &no_quantizer).unwrap();

    assert_eq!(image.stride(), 20);
    assert_eq!(&image.data()[.. 4], &[ rgba[2], rgba[1], rgba[0], rgba[3] ]);
    assert_eq!(decode_rgba(&image.to_png_bytes().unwrap()), rgba);
}

#[test]
fn export_ignores_stride_padding(){
    let rgba = gradient(3, 4);
    let png = encode(3, 4, png::ColorType::Rgba, png::BitDepth::Eight, None, &rgba);

    let options = PngImportOptions::default().with_format(ColorFormat::Argb8888);
    let mut image = Image::from_png_bytes(&png, options, &no_quantizer).unwrap();
    image.adjust_stride(0, 64).unwrap();

    let exported = image.to_png_bytes().unwrap();
    assert_eq!(image.stride(), 64, "exporting must not change the image");
    assert_eq!(decode_rgba(&exported), rgba);
}

#[test]
fn truecolor_is_quantized_for_indexed_formats(){
    let rgb = vec![ 255, 0, 0,   0, 0, 255 ];
    let png = encode(2, 1, png::ColorType::Rgb, png::BitDepth::Eight, None, &rgb);

    let requested_colors = Cell::new(0);
    let quantizer = |_: &[u8], colors: usize| -> Result<Vec<u8>> {
        requested_colors.set(colors);
        let palette = vec![ 255, 0, 0,   0, 0, 255 ];
        Ok(encode(2, 1, png::ColorType::Indexed, png::BitDepth::Four, Some(palette), &[ 0x01 ]))
    };

    let options = PngImportOptions::default().with_format(ColorFormat::I4);
    let image = Image::from_png_bytes(&png, options, &quantizer).unwrap();

    assert_eq!(requested_colors.get(), 16);
    assert_eq!(image.format(), ColorFormat::I4);
    assert_eq!(image.palette().len(), 16 * 4);
    assert_eq!(&image.palette()[.. 8], &[ 0, 0, 255, 255,   255, 0, 0, 255 ]);
    assert_eq!(&image.palette()[8 .. 12], &[ 255, 255, 255, 0 ], "extended with transparent white");
    assert_eq!(image.rows(), &[ 0x01 ]);
}

#[test]
fn quantizer_failures_are_reported(){
    let png = encode(1, 1, png::ColorType::Rgb, png::BitDepth::Eight, None, &[ 1, 2, 3 ]);
    let quantizer = |_: &[u8], _: usize| -> Result<Vec<u8>> {
        Err(Error::External { tool: "stub".into(), message: "out of colors".to_string() })
    };

    let options = PngImportOptions::default().with_format(ColorFormat::I2);
    let result = Image::from_png_bytes(&png, options, &quantizer);
    assert!(matches!(result, Err(Error::External { .. })));
}

#[test]
fn format_from_file_name(){
    let directory = temporary_directory("file-name");
    std::fs::create_dir_all(&directory).unwrap();

    let rgba = gradient(4, 2);
    let path = directory.join("mask.A8.png");
    std::fs::write(&path, encode(4, 2, png::ColorType::Rgba, png::BitDepth::Eight, None, &rgba)).unwrap();

    let image = Image::from_png(&path, PngImportOptions::default(), &no_quantizer).unwrap();
    assert_eq!(image.format(), ColorFormat::A8);

    let alpha: Vec<u8> = rgba.chunks_exact(4).map(|pixel| pixel[3]).collect();
    assert_eq!(image.rows(), alpha.as_slice());
}

#[test]
fn convert_to_binary_file(){
    let directory = temporary_directory("convert");
    std::fs::create_dir_all(&directory).unwrap();

    let input = directory.join("icon.png");
    std::fs::write(&input, encode(3, 2, png::ColorType::Rgba, png::BitDepth::Eight, None, &gradient(3, 2))).unwrap();

    let options = ConvertOptions::default()
        .with_format(ColorFormat::Rgb565)
        .with_alignment(4)
        .with_compression(CompressMethod::Rle);

    let (output, image) = options.convert_png(&input, directory.join("out"), &no_quantizer).unwrap();

    assert_eq!(output, directory.join("out").join("icon.bin"));
    assert_eq!(image.stride(), 8);
    assert_eq!(Image::from_bin(&output).unwrap(), image);
}

#[test]
fn convert_to_c_source(){
    let directory = temporary_directory("convert-c");
    std::fs::create_dir_all(&directory).unwrap();

    let input = directory.join("small-logo.png");
    std::fs::write(&input, encode(2, 2, png::ColorType::Rgba, png::BitDepth::Eight, None, &gradient(2, 2))).unwrap();

    let options = ConvertOptions::default()
        .with_format(ColorFormat::Argb8888)
        .with_premultiply(true)
        .with_output(OutputFormat::CArray);

    let (output, image) = options.convert_png(&input, &directory, &no_quantizer).unwrap();
    assert!(image.is_premultiplied());

    let source = std::fs::read_to_string(&output).unwrap();
    assert!(source.contains("const lv_img_dsc_t small_logo = {"));
    assert!(source.contains(".header.flags = 0 | LV_IMAGE_FLAGS_PREMULTIPLIED,"));
}
