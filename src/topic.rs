//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Topic names and topic filters
//!
//! Both are UTF-8 strings split into levels by `/`. Names are what messages are published to and
//! must not contain wildcards, filters are what clients subscribe with and may contain `+` as a
//! whole level or `#` as the whole last level.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TopicError {
    #[error("MQTT Topics are not allowed to be empty")]
    Empty,

    #[error("MQTT Topics are not allowed to contain a NULL (U+0000) character")]
    Null,

    #[error("MQTT Topic names are not allowed to contain MQTT wildcard characters ('#' or '+')")]
    Wildcard,

    #[error("A wildcard has to occupy a whole topic level")]
    MixedWildcardLevel,

    #[error("The multi-level wildcard ('#') has to be the last topic level")]
    MultiLevelWildcardNotLast,
}

fn check_common(topic: &str) -> Result<(), TopicError> {
    if topic.is_empty() {
        return Err(TopicError::Empty);
    }

    if topic.contains('\0') {
        return Err(TopicError::Null);
    }

    Ok(())
}

#[doc = crate::util::md_speclink!("_Toc3901107")]
pub fn validate_topic_name(name: &str) -> Result<(), TopicError> {
    check_common(name)?;

    if name.contains(['#', '+']) {
        return Err(TopicError::Wildcard);
    }

    Ok(())
}

#[doc = crate::util::md_speclink!("_Toc3901241")]
pub fn validate_topic_filter(filter: &str) -> Result<(), TopicError> {
    check_common(filter)?;

    let mut levels = filter.split('/').peekable();
    while let Some(level) = levels.next() {
        match level {
            "#" if levels.peek().is_some() => return Err(TopicError::MultiLevelWildcardNotLast),
            "#" | "+" => {}
            level if level.contains(['#', '+']) => return Err(TopicError::MixedWildcardLevel),
            _ => {}
        }
    }

    Ok(())
}
