use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Trial state machine.
///
/// A trial only closes in `Correct`: a wrong first answer detours through
/// feedback and a retry that accepts nothing but the expected key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Presenting,
    AwaitingResponse,
    Correct,
    Incorrect,
    CorrectiveFeedback,
    AwaitingRetry,
}

impl TrialState {
    pub fn can_advance_to(self, next: TrialState) -> bool {
        use TrialState::*;
        matches!(
            (self, next),
            (Presenting, AwaitingResponse)
                | (AwaitingResponse, Correct)
                | (AwaitingResponse, Incorrect)
                | (Incorrect, CorrectiveFeedback)
                | (CorrectiveFeedback, AwaitingRetry)
                | (AwaitingRetry, Correct)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == TrialState::Correct
    }
}

/// One row of the output dataset, in `ISI, Content, corrAns, RT, trialName` column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    #[serde(rename = "ISI")]
    pub isi: f64,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(
        rename = "corrAns",
        serialize_with = "flag_to_int",
        deserialize_with = "int_to_flag"
    )]
    pub correct_on_first_try: bool,
    #[serde(rename = "RT")]
    pub reaction_time_secs: f64,
    #[serde(rename = "trialName")]
    pub block_name: String,
}

impl TrialResult {
    pub const HEADER: [&'static str; 5] = ["ISI", "Content", "corrAns", "RT", "trialName"];
}

fn flag_to_int<S: Serializer>(flag: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*flag))
}

fn int_to_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(u8::deserialize(d)? != 0)
}
