use log::{debug, info};
use pixels::{Pixels, SurfaceTexture};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, KeyboardInput, MouseScrollDelta, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use crate::render::raster::rasterize_sized;
use crate::render::{check_resolution, RenderError};
use crate::scene::{Figure, ScrollAccumulator};

/// Shows the figure until the window is closed or Escape is pressed. The
/// scroll wheel zooms through the figure's zoom handler.
pub fn display(figure: &mut Figure, dpi: f64) -> Result<(), RenderError> {
    check_resolution(dpi)?;
    let (width, height) = figure.pixel_size(dpi);

    let mut event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(figure.axes.title.as_str())
        .with_inner_size(LogicalSize::new(width as f64, height as f64))
        .with_min_inner_size(LogicalSize::new(320.0, 240.0))
        .build(&event_loop)?;

    let size = window.inner_size();
    let mut width = size.width.max(1);
    let mut height = size.height.max(1);
    let surface_texture = SurfaceTexture::new(width, height, &window);
    let mut pixels = Pixels::new(width, height, surface_texture)?;
    let mut scroll = ScrollAccumulator::default();
    let mut failure: Option<RenderError> = None;
    info!("window open at {width}x{height}");

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => *control_flow = ControlFlow::Exit,
                WindowEvent::MouseWheel { delta, .. } => {
                    let notches = match delta {
                        MouseScrollDelta::LineDelta(_, y) => scroll.lines(y as f64),
                        MouseScrollDelta::PixelDelta(position) => scroll.pixels(position.y),
                    };
                    if let Some((direction, count)) = notches {
                        let mut changed = false;
                        for _ in 0..count {
                            changed |= figure.handle_scroll(direction);
                        }
                        if changed {
                            window.request_redraw();
                        }
                    }
                }
                WindowEvent::Resized(new_size) => {
                    (width, height) = (new_size.width.max(1), new_size.height.max(1));
                    match resize(&mut pixels, width, height) {
                        Ok(()) => window.request_redraw(),
                        Err(err) => {
                            failure = Some(err);
                            *control_flow = ControlFlow::Exit;
                        }
                    }
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    let PhysicalSize { width: w, height: h } = *new_inner_size;
                    (width, height) = (w.max(1), h.max(1));
                    if let Err(err) = resize(&mut pixels, width, height) {
                        failure = Some(err);
                        *control_flow = ControlFlow::Exit;
                    }
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let canvas = rasterize_sized(figure, width, height);
                pixels.frame_mut().copy_from_slice(canvas.as_raw());
                if let Err(err) = pixels.render() {
                    failure = Some(err.into());
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
    debug!("window closed");

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn resize(pixels: &mut Pixels, width: u32, height: u32) -> Result<(), RenderError> {
    pixels.resize_surface(width, height)?;
    pixels.resize_buffer(width, height)?;
    Ok(())
}
