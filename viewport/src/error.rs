use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Window {window} is closed"))]
    WindowClosed { window: u64 },

    #[snafu(display("Window {window} dropped the reply to a request"))]
    ReplyDropped { window: u64 },
}
