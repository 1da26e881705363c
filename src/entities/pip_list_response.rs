use nestify::nest;
use serde::Deserialize;

nest! {
    /// One row of `pip list --format=json`. The outdated listing adds the
    /// `latest_*` fields; the up-to-date listing leaves them out.
    #[derive(Debug, Deserialize)]
    pub struct PipListEntry {
        pub name: String,
        pub version: String,
        #[serde(default)]
        pub latest_version: Option<String>,
        #[serde(default)]
        pub latest_filetype: Option<
            #[derive(Debug, Deserialize, PartialEq)]
            #[serde(rename_all = "lowercase")]
            pub enum PipFileType {
                Wheel,
                Sdist,
                #[serde(other)]
                Other,
            }
        >,
    }
}

/// `pip list --format=json` prints a bare array of entries
pub type PipListResponse = Vec<PipListEntry>;
