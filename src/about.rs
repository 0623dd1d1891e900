pub const DNA_COMPARE_DISPLAY_VERSION: &str = env!("DNA_COMPARE_DISPLAY_VERSION");
pub const DNA_COMPARE_BUILD_N: &str = env!("DNA_COMPARE_BUILD_N");

pub const LONG_VERSION: &str = concat!(
    env!("DNA_COMPARE_DISPLAY_VERSION"),
    "\nBuild ",
    env!("DNA_COMPARE_BUILD_N"),
    "\nDNA sequence analysis and comparison"
);
