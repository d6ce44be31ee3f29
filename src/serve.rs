/* ------------------------------------------------------------------ */
/* HTTP prediction endpoint                                           */
/* ------------------------------------------------------------------ */
//
// POST / with {"name": "Satoshi", "k": 3} returns the top-k guesses
// for the freshly trained in-memory model. Nothing is persisted; the
// model lives only as long as the process.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::config::TOP_K;
use crate::corpus::Corpus;
use crate::eval::{predict_topk, Scorer};

#[derive(Deserialize)]
struct PredictRequest {
    name: String,
    #[serde(default = "default_k")]
    k: usize,
}

fn default_k() -> usize {
    TOP_K
}

#[derive(Serialize)]
struct Prediction {
    score: f32,
    category: String,
}

#[derive(Serialize)]
struct PredictResponse {
    predictions: Vec<Prediction>,
    model: String,
}

fn json_content_type() -> Header {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap()
}

fn error_response(msg: &str, code: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": msg }).to_string();
    Response::from_string(body)
        .with_status_code(StatusCode(code))
        .with_header(json_content_type())
}

pub fn run_server<S: Scorer>(addr: &str, model: &S, corpus: &Corpus, model_name: &str) {
    let server = Server::http(addr).unwrap_or_else(|e| {
        eprintln!("Failed to bind to {}: {}", addr, e);
        std::process::exit(1);
    });

    println!("Server listening on http://{}", addr);
    println!("POST http://{}/ with JSON body:", addr);
    println!("  {{\"name\": \"Satoshi\", \"k\": 3}}");
    println!("Press Ctrl-C to stop.");
    println!();

    for mut request in server.incoming_requests() {
        if *request.method() != Method::Post {
            let _ = request.respond(error_response("Method Not Allowed", 405));
            continue;
        }

        let mut body = String::new();
        if request.as_reader().read_to_string(&mut body).is_err() {
            let _ = request.respond(error_response("Failed to read request body", 400));
            continue;
        }

        let req: PredictRequest = match serde_json::from_str(&body) {
            Ok(r) => r,
            Err(e) => {
                let _ = request.respond(error_response(&e.to_string(), 400));
                continue;
            }
        };

        eprintln!("[serve] name={:?} k={}", &req.name, req.k);

        let predictions = match predict_topk(model, corpus, &req.name, req.k) {
            Ok(preds) => preds,
            Err(e) => {
                let _ = request.respond(error_response(&e.to_string(), 400));
                continue;
            }
        };

        let resp = PredictResponse {
            predictions: predictions
                .into_iter()
                .map(|(score, category)| Prediction { score, category })
                .collect(),
            model: model_name.to_string(),
        };

        let json = serde_json::to_string(&resp)
            .unwrap_or_else(|_| "{\"predictions\":[]}".to_string());
        let _ = request.respond(Response::from_string(json).with_header(json_content_type()));
    }
}
