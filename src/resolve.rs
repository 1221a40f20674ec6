use crate::month::MonthKey;
use crate::store::ImageMapping;

/// Which image, if any, a month renders with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Specific(String),
    Fallback(String),
    Missing,
}

impl Resolution {
    pub fn path(&self) -> Option<&str> {
        match self {
            Resolution::Specific(path) | Resolution::Fallback(path) => Some(path.as_str()),
            Resolution::Missing => None,
        }
    }

    pub fn is_specific(&self) -> bool {
        matches!(self, Resolution::Specific(_))
    }
}

pub fn resolve<M: ImageMapping + ?Sized>(
    month: &MonthKey,
    mapping: &M,
    fallback: Option<&str>,
) -> Resolution {
    if let Some(path) = mapping.image_for(month) {
        Resolution::Specific(path)
    } else if let Some(path) = fallback {
        Resolution::Fallback(path.to_owned())
    } else {
        Resolution::Missing
    }
}
