use crate::runtime::build_request::{BuildLaunchRequest, BuildRunHandle};

pub trait BuildLauncher {
    fn start_build(&self, request: &BuildLaunchRequest) -> Result<BuildRunHandle, String>;
}
