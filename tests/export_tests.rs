use std::io;
use std::path::{Path, PathBuf};

use sci_figure::api::{
    DataLine, Figure, FigureFileSystem, SaveOptions, StyleContext, save_figure, save_figure_with,
};
use sci_figure::core::DataPoint;
use sci_figure::error::FigureError;
use sci_figure::render::Color;

#[derive(Debug, Clone, PartialEq)]
enum FsCall {
    DirExists(PathBuf),
    CreateDirAll(PathBuf),
    Write(PathBuf, usize),
}

#[derive(Debug, Default)]
struct RecordingFs {
    existing_dirs: Vec<PathBuf>,
    calls: std::cell::RefCell<Vec<FsCall>>,
    written: Vec<u8>,
}

impl FigureFileSystem for RecordingFs {
    fn dir_exists(&self, path: &Path) -> bool {
        self.calls.borrow_mut().push(FsCall::DirExists(path.to_path_buf()));
        self.existing_dirs.iter().any(|dir| dir == path)
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        self.calls.get_mut().push(FsCall::CreateDirAll(path.to_path_buf()));
        Ok(())
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.calls.get_mut().push(FsCall::Write(path.to_path_buf(), bytes.len()));
        self.written = bytes.to_vec();
        Ok(())
    }
}

fn line_figure() -> Figure {
    let mut figure = Figure::new(4.0, 3.0, StyleContext::default()).expect("figure");
    let view = figure.current_view();
    figure
        .view_mut(view)
        .expect("view")
        .add_line(DataLine::new(
            vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 2.0), DataPoint::new(2.0, 1.0)],
            Color::BLACK,
        ))
        .expect("line");
    figure
}

#[test]
fn disabled_save_touches_nothing() {
    let mut fs = RecordingFs::default();
    let saved = save_figure_with(&mut fs, false, &line_figure(), "plot.svg", &SaveOptions::default())
        .expect("disabled save");
    assert_eq!(saved, None);
    assert!(fs.calls.borrow().is_empty());
}

#[test]
fn missing_directory_is_created_before_writing() {
    let mut fs = RecordingFs::default();
    let saved = save_figure_with(&mut fs, true, &line_figure(), "plot.svg", &SaveOptions::default())
        .expect("save");

    let path = PathBuf::from("figure/plot.svg");
    assert_eq!(saved, Some(path.clone()));
    let calls = fs.calls.borrow();
    assert_eq!(calls[0], FsCall::DirExists(PathBuf::from("figure/")));
    assert_eq!(calls[1], FsCall::CreateDirAll(PathBuf::from("figure/")));
    assert!(matches!(&calls[2], FsCall::Write(written, len) if *written == path && *len > 0));
    assert!(String::from_utf8_lossy(&fs.written).starts_with("<svg"));
}

#[test]
fn existing_directory_is_reused() {
    let mut fs = RecordingFs {
        existing_dirs: vec![PathBuf::from("out")],
        ..RecordingFs::default()
    };
    let options = SaveOptions {
        directory: PathBuf::from("out"),
        ..SaveOptions::default()
    };
    save_figure_with(&mut fs, true, &line_figure(), "plot.svg", &options).expect("save");
    assert!(
        !fs.calls
            .borrow()
            .iter()
            .any(|call| matches!(call, FsCall::CreateDirAll(_)))
    );
}

#[test]
fn unknown_extension_fails_before_writing() {
    let mut fs = RecordingFs::default();
    let err = save_figure_with(&mut fs, true, &line_figure(), "plot.tiff", &SaveOptions::default())
        .expect_err("unsupported");
    assert!(matches!(err, FigureError::UnsupportedFormat(_)));
    assert!(fs.calls.borrow().is_empty());
}

#[cfg(not(feature = "cairo-backend"))]
#[test]
fn png_needs_the_cairo_backend() {
    let mut fs = RecordingFs::default();
    let err = save_figure_with(&mut fs, true, &line_figure(), "plot.png", &SaveOptions::default())
        .expect_err("no png backend");
    assert!(matches!(err, FigureError::UnsupportedFormat(_)));
}

#[test]
fn tight_crop_shrinks_the_page() {
    let figure = line_figure();
    let frame = figure.build_render_frame().expect("frame");
    let cropped = frame.cropped_to_content(7.2);

    assert!(cropped.viewport.width <= frame.viewport.width + 14.4);
    let (left, top, right, bottom) = cropped.content_bounds().expect("content");
    assert!(left >= 7.2 - 1e-9 && top >= 7.2 - 1e-9);
    assert!(right <= cropped.viewport.width - 7.2 + 1e-9);
    assert!(bottom <= cropped.viewport.height - 7.2 + 1e-9);
}

#[test]
fn svg_is_written_to_disk() {
    let directory = std::env::temp_dir().join(format!("sci-figure-export-{}", std::process::id()));
    let options = SaveOptions {
        directory: directory.clone(),
        ..SaveOptions::default()
    };

    let path = save_figure(true, &line_figure(), "nested/plot.svg", &options)
        .expect("save")
        .expect("path");

    assert_eq!(path, directory.join("nested/plot.svg"));
    let document = std::fs::read_to_string(&path).expect("read back");
    assert!(document.starts_with("<svg"));
    assert!(document.contains("<line"));
    std::fs::remove_dir_all(&directory).expect("cleanup");
}
