mod batch;
mod identity;
mod keys;
mod locate;
mod recovery;
