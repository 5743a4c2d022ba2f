mod mistral;

pub use mistral::MistralCompletion;
