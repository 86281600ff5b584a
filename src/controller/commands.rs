/// User actions delivered to a running controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    PickSource,
    ChooseSaveLocation,
    StartRecording,
    StopRecording,
    DismissMessage,
    /// Release the capture source and leave the event loop
    Shutdown,
}
