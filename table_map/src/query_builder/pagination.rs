/// Window over an ordered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub skip: u64,
    pub take: u64,
}

impl Paging {
    pub fn new(skip: u64, take: u64) -> Self {
        Self { skip, take }
    }

    /// Resolve the `{skip}` and `{take}` placeholders of a paging clause
    pub(crate) fn placeholder(&self, name: &str) -> Option<String> {
        match name {
            "skip" => Some(self.skip.to_string()),
            "take" => Some(self.take.to_string()),
            _ => None,
        }
    }
}
