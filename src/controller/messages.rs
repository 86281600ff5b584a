// User-facing banner texts

use crate::capability::HostFlavor;
use crate::capture::CaptureError;
use crate::encoder::EncoderError;
use crate::view::Banner;

const BRAVE_CAPTURE_TIP: &str = " In Brave, allow screen sharing for this site in the Shields panel \
     and make sure the page is not opened in a private window.";

const BRAVE_SAVE_TIP: &str =
    " In Brave, enable the File System Access API under brave://flags to choose a location.";

pub fn capture_failure(err: &CaptureError, host: HostFlavor) -> Banner {
    match err {
        CaptureError::PermissionDenied(_) => Banner::info(
            "Screen sharing permission was denied. Click \"Select source\" to try again.",
        ),
        CaptureError::SecurityRejected(_) => {
            let mut text = String::from(
                "Screen capture was blocked by the browser's security policy, \
                 not by your answer to the share prompt. \
                 Check the site permissions and reload the page.",
            );
            if host == HostFlavor::Brave {
                text.push_str(BRAVE_CAPTURE_TIP);
            }
            Banner::warning(text)
        }
        _ => Banner::error(format!(
            "Could not start screen capture: {} - {}",
            err.name(),
            err.message()
        )),
    }
}

pub fn no_supported_profile() -> Banner {
    Banner::error(
        "This browser cannot record in any supported format. \
         Please use a recent version of Chrome, Edge or Firefox.",
    )
}

pub fn encoder_failure(err: &EncoderError) -> Banner {
    Banner::error(format!("Could not start recording: {}", err))
}

pub fn save_blocked(host: HostFlavor) -> Banner {
    let mut text = String::from(
        "Choosing a save location was blocked by the browser. \
         Recordings will go to your downloads folder instead.",
    );
    if host == HostFlavor::Brave {
        text.push_str(BRAVE_SAVE_TIP);
    }
    Banner::warning(text)
}

pub const CONFIRM_INTERACTIVE_SAVE: &str =
    "Choose where to save the recording? Select \"No\" to save it to your downloads folder.";
