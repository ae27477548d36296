//! Integration tests exercising the full pipeline with real default
//! collaborators (SQLite store, trigram embedder) and scripted LLM/web mocks.

mod end_to_end;
