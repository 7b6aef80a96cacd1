use tracing::{error, info};
use windows::Win32::{
    Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM},
    System::LibraryLoader::GetModuleHandleA,
    UI::WindowsAndMessaging::*,
};

use crate::input::{key, InputState};
use crate::renderer::Renderer;
use crate::timer::FrameTimer;
use crate::Config;

/// Everything the render loop owns; constructed after the window exists and
/// torn down when `run` returns.
struct App {
    renderer: Renderer,
    input: InputState,
    timer: FrameTimer,
}

impl App {
    fn frame(&mut self) -> windows::core::Result<()> {
        self.timer.sample();
        self.renderer.update(&self.input, &self.timer);
        self.renderer.render()
    }
}

pub fn run(config: &Config) -> crate::Result<()> {
    let name = windows::core::s!("hypernova_window");

    let instance = unsafe { GetModuleHandleA(None) }?;

    let wnd_class = WNDCLASSEXA {
        cbSize: std::mem::size_of::<WNDCLASSEXA>() as u32,
        style: CS_HREDRAW | CS_VREDRAW, // redraw when window size or position changes
        lpfnWndProc: Some(wnd_proc),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }?,
        lpszClassName: name,
        ..Default::default()
    };
    debug_assert_ne!(unsafe { RegisterClassExA(&wnd_class) }, 0);

    // the window procedure reaches the app through this slot; it stays
    // `None` until the renderer is up
    let mut app: Option<App> = None;

    let (style, x, y, width, height) = if config.fullscreen() {
        // borderless window covering the primary monitor
        let width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
        let height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
        (WS_POPUP, 0, 0, width, height)
    } else {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: config.client_width() as i32,
            bottom: config.client_height() as i32,
        };
        unsafe { AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, false) }?;
        (
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            rect.right - rect.left,
            rect.bottom - rect.top,
        )
    };

    let hwnd = unsafe {
        CreateWindowExA(
            WINDOW_EX_STYLE::default(),
            name,
            windows::core::s!("Hypernova"),
            style,
            x,
            y,
            width,
            height,
            None,
            None,
            instance,
            Some(&mut app as *mut Option<App> as *mut std::ffi::c_void),
        )
    }?;

    app = Some(App {
        renderer: Renderer::new(hwnd, config)?,
        input: InputState::new(),
        timer: FrameTimer::new(),
    });

    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
    }
    info!("entering the render loop");

    let mut msg = MSG::default();
    while msg.message != WM_QUIT {
        if unsafe { PeekMessageA(&mut msg, None, 0, 0, PM_REMOVE) }.into() {
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageA(&msg);
            }
        } else if let Some(app) = app.as_mut() {
            // advance a frame whenever the message queue is idle
            if let Err(e) = app.frame() {
                // device removal and friends are fatal; no per-frame retry
                error!("frame failed, shutting down: {e}");
                unsafe {
                    let _ = DestroyWindow(hwnd);
                }
                return Err(e.into());
            }
        }
    }

    Ok(())
}

fn with_app(hwnd: HWND, f: impl FnOnce(&mut App)) {
    let user_data = unsafe { GetWindowLongPtrA(hwnd, GWLP_USERDATA) };
    if let Some(mut ptr) = std::ptr::NonNull::<Option<App>>::new(user_data as _) {
        if let Some(app) = unsafe { ptr.as_mut() } {
            f(app);
        }
    }
}

extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_CREATE => {
            unsafe {
                let data: &CREATESTRUCTA = std::mem::transmute(lparam);
                SetWindowLongPtrA(hwnd, GWLP_USERDATA, data.lpCreateParams as _);
            }
            LRESULT::default()
        }
        WM_KEYDOWN => {
            let code = wparam.0 as u32;
            if code == key::ESCAPE {
                unsafe {
                    let _ = DestroyWindow(hwnd);
                }
            } else {
                with_app(hwnd, |app| app.input.set_down(code));
            }
            LRESULT::default()
        }
        WM_KEYUP => {
            with_app(hwnd, |app| app.input.set_up(wparam.0 as u32));
            LRESULT::default()
        }
        WM_PAINT => {
            // frames are driven by the idle loop; let DefWindowProc
            // validate the dirty region
            unsafe { DefWindowProcA(hwnd, msg, wparam, lparam) }
        }
        WM_DESTROY => {
            unsafe {
                PostQuitMessage(0);
            }
            LRESULT::default()
        }
        _ => unsafe { DefWindowProcA(hwnd, msg, wparam, lparam) },
    }
}
