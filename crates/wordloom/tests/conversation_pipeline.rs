//! File -> tokenizer -> conversation driver.

use std::{cell::RefCell, fs, path::PathBuf};

use tempdir::TempDir;
use wordloom::{
    Tokenizer, TokenizerOptions, WLError, WLResult,
    generation::{
        Conversation, ConversationLog, ConversationStatus, Evaluation, Evaluator,
        GenerationOptions, HiddenState, StopReason, TurnTemplate,
    },
    sampling::SamplerOptions,
};

const TOKENIZER_JSON: &str = r#"{
    "version": "1.0",
    "added_tokens": [
        {"id": 0, "content": "<|endoftext|>", "single_word": false, "lstrip": false,
         "rstrip": false, "normalized": false, "special": true}
    ],
    "normalizer": {"type": "NFC"},
    "pre_tokenizer": {"type": "ByteLevel", "add_prefix_space": false, "trim_offsets": true},
    "post_processor": {"type": "ByteLevel", "add_prefix_space": false, "trim_offsets": true},
    "decoder": {"type": "ByteLevel", "add_prefix_space": true, "trim_offsets": true},
    "model": {
        "type": "BPE",
        "dropout": null,
        "unk_token": null,
        "vocab": {
            "<|endoftext|>": 0,
            "Ġ": 1, "Ċ": 2, ":": 3,
            "a": 4, "b": 5, "e": 6, "h": 7, "i": 8, "o": 9, "s": 10, "t": 11,
            "y": 12, "r": 13,
            "Ġh": 14, "Ġhi": 15, "Ġt": 16, "Ġth": 17, "Ġthe": 18, "Ġther": 19, "Ġthere": 20,
            "ĠB": 21, "ĠBo": 22, "ĠBot": 23, "ĠU": 24, "ĠUs": 25, "ĠUse": 26, "ĠUser": 27
        },
        "merges": [
            "Ġ h", "Ġh i",
            "Ġ t", "Ġt h", "Ġth e", "Ġthe r", "Ġther e",
            "Ġ B", "ĠB o", "ĠBo t",
            "Ġ U", "ĠU s", "ĠUs e", "ĠUse r"
        ]
    }
}"#;

const HI: u32 = 15;
const THERE: u32 = 20;
const NEWLINE: u32 = 2;
const END_OF_TEXT: u32 = 0;

fn write_tokenizer_json(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("tokenizer.json");
    fs::write(&path, TOKENIZER_JSON).unwrap();
    path
}

fn load_tokenizer() -> (TempDir, Tokenizer<u32>) {
    let dir = TempDir::new("wordloom_pipeline").unwrap();
    let path = write_tokenizer_json(&dir);
    let tokenizer = Tokenizer::from_path(&path, TokenizerOptions::default()).unwrap();
    (dir, tokenizer)
}

/// Answers " hi there" then a newline, then end-of-text; records every token.
#[derive(Debug, Default)]
struct ReplyEvaluator {
    seen: RefCell<Vec<u32>>,
}

impl Evaluator<u32> for ReplyEvaluator {
    fn evaluate(
        &self,
        token: u32,
        prior: Option<&HiddenState>,
    ) -> WLResult<Evaluation> {
        self.seen.borrow_mut().push(token);

        let next = match token {
            HI => THERE,
            THERE => NEWLINE,
            NEWLINE => END_OF_TEXT,
            _ => HI,
        };
        let mut logits = vec![-5.0; 28];
        logits[next as usize] = 5.0;

        let depth = prior.map_or(0.0, |s| s.as_slice()[0]) + 1.0;
        Ok(Evaluation::new(vec![depth], logits))
    }
}

#[test]
fn test_load_and_encode() {
    let (_dir, tokenizer) = load_tokenizer();

    assert_eq!(tokenizer.encode_ids("hi there").unwrap(), vec![HI, THERE]);
    assert_eq!(
        tokenizer.encode_ids("\n\nUser: hi\n\nBot:").unwrap(),
        vec![NEWLINE, NEWLINE, 27, 3, HI, NEWLINE, NEWLINE, 23, 3]
    );
    assert_eq!(
        tokenizer.decode(&[HI, THERE, NEWLINE, END_OF_TEXT]),
        " hi there\n<|endoftext|>"
    );
}

#[test]
fn test_unsupported_pipeline_component() {
    let dir = TempDir::new("wordloom_pipeline").unwrap();
    let path = dir.path().join("tokenizer.json");
    fs::write(
        &path,
        TOKENIZER_JSON.replace(r#""normalizer": {"type": "NFC"}"#, r#""normalizer": {"type": "NFKC"}"#),
    )
    .unwrap();

    assert!(matches!(
        Tokenizer::<u32>::from_path(&path, TokenizerOptions::default()),
        Err(WLError::Configuration {
            component: "normalizer",
            ..
        })
    ));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new("wordloom_pipeline").unwrap();
    assert!(matches!(
        Tokenizer::<u32>::from_path(dir.path().join("nope.json"), TokenizerOptions::default()),
        Err(WLError::Io(_))
    ));
}

#[test]
fn test_generation_before_input_is_rejected() {
    let (_dir, tokenizer) = load_tokenizer();
    let mut conv = Conversation::with_seed(tokenizer, ReplyEvaluator::default(), 7);

    assert!(matches!(
        conv.generate_response(&GenerationOptions::default(), |_| true),
        Err(WLError::Usage(_))
    ));
    assert!(conv.evaluator().seen.borrow().is_empty());
}

#[test]
fn test_chat_session_round_trip() {
    let (dir, tokenizer) = load_tokenizer();
    let template = TurnTemplate::default();
    let options = GenerationOptions::default()
        .with_stop_string("\n")
        .with_sampler(SamplerOptions::greedy());

    let mut conv = Conversation::with_seed(tokenizer.clone(), ReplyEvaluator::default(), 7);
    assert_eq!(conv.status(), ConversationStatus::Idle);

    let mut streamed = String::new();
    let turn = conv
        .chat("hi", &template, &options, |s| {
            streamed.push_str(s);
            true
        })
        .unwrap();

    // The stop string is streamed, but cut from the response.
    assert_eq!(turn.bot_text, " hi there");
    assert_eq!(streamed, " hi there\n");
    assert_eq!(
        conv.status(),
        ConversationStatus::Stopped(StopReason::StopString)
    );

    let mut log = ConversationLog::new();
    log.push_turn(turn);
    let log_path = dir.path().join("conversation.json");
    fs::write(&log_path, log.to_json().unwrap()).unwrap();

    // A new session replays the persisted turns.
    let reloaded = ConversationLog::from_reader(fs::File::open(&log_path).unwrap()).unwrap();
    assert_eq!(reloaded, log);

    let mut resumed = Conversation::with_seed(tokenizer, ReplyEvaluator::default(), 7);
    let consumed = resumed.replay(&reloaded, &template).unwrap();
    assert_eq!(consumed, resumed.evaluator().seen.borrow().len());
    assert_eq!(resumed.status(), ConversationStatus::Primed);
    assert_eq!(
        resumed.hidden_state().unwrap().as_slice(),
        &[consumed as f32]
    );
}

#[test]
fn test_sampling_stays_in_nucleus() {
    let (_dir, tokenizer) = load_tokenizer();
    let mut conv = Conversation::with_seed(tokenizer, ReplyEvaluator::default(), 11);
    conv.process_input("hi").unwrap();

    let options = GenerationOptions::default()
        .with_max_tokens(3)
        .with_sampler(SamplerOptions::default().with_top_p(0.5));
    let response = conv.generate_response(&options, |_| true).unwrap();

    assert_eq!(response, " there\n<|endoftext|>");
    assert_eq!(conv.status(), ConversationStatus::Exhausted);
}

#[test]
fn test_logit_bias_suppresses_token() {
    let (_dir, tokenizer) = load_tokenizer();
    let mut conv = Conversation::with_seed(tokenizer, ReplyEvaluator::default(), 3);
    conv.process_input("hi").unwrap();

    let options = GenerationOptions::default()
        .with_max_tokens(1)
        .with_sampler(SamplerOptions::greedy().with_logit_bias([(THERE as usize, f32::NEG_INFINITY)]));
    let response = conv.generate_response(&options, |_| true).unwrap();

    assert_eq!(response, "<|endoftext|>");
}
